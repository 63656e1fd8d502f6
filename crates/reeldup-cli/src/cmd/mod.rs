//! Command implementations for the `reeldup` CLI.
//!
//! Each submodule takes the parsed [`crate::Cli`] and returns `Ok(())` on
//! success or a [`crate::error::CliError`] on failure.
pub mod find;
