//! CLI error types with associated exit codes.
//!
//! [`CliError`] is the top-level error type for the `reeldup` binary. Every
//! variant maps to a stable exit code via [`CliError::exit_code`]:
//!
//! - Exit code **2**: input failure. The catalog could not be read or
//!   contains a malformed line; nothing is written.
//! - Exit code **1**: the input was fine but the run could not complete
//!   (rejected configuration, report could not be written).
use std::fmt;
use std::path::PathBuf;

use reeldup_core::{ConfigError, LoadError};

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `reeldup` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// The catalog file does not exist.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read the catalog.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes; `None` for stdin.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// A human-readable label for the source.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// Any other I/O error while reading the catalog.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// A catalog line could not be loaded.
    MalformedCatalog {
        /// A human-readable label for the source.
        source: String,
        /// The loader error, including its line number.
        error: LoadError,
    },

    // --- Exit code 1: run failures ---
    /// The matching configuration was rejected.
    InvalidConfig(ConfigError),

    /// The report could not be written.
    WriteFailed {
        /// `"-"` for stdout, or the filesystem path.
        target: String,
        /// The underlying I/O error message.
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::MalformedCatalog { .. } => 2,

            Self::InvalidConfig(_) | Self::WriteFailed { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::MalformedCatalog { source, error } => {
                format!("error: malformed catalog {source}: {error}")
            }
            Self::InvalidConfig(error) => format!("error: invalid configuration: {error}"),
            Self::WriteFailed { target, detail } => {
                format!("error: cannot write {target}: {detail}")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::InvalidConfig(error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::path::PathBuf;

    use super::*;

    // ── exit_code ────────────────────────────────────────────────────────────

    #[test]
    fn input_failures_are_exit_2() {
        let errors = [
            CliError::FileNotFound {
                path: PathBuf::from("movies.tsv"),
            },
            CliError::PermissionDenied {
                path: PathBuf::from("/root/movies.tsv"),
            },
            CliError::FileTooLarge {
                source: "big.tsv".to_owned(),
                limit: 1024,
                actual: Some(2048),
            },
            CliError::InvalidUtf8 {
                source: "bad.tsv".to_owned(),
                byte_offset: 42,
            },
            CliError::StdinReadError {
                detail: "broken pipe".to_owned(),
            },
            CliError::IoError {
                source: "movies.tsv".to_owned(),
                detail: "device error".to_owned(),
            },
            CliError::MalformedCatalog {
                source: "movies.tsv".to_owned(),
                error: LoadError::WrongFieldCount { line: 3, found: 4 },
            },
        ];
        for e in &errors {
            assert_eq!(e.exit_code(), 2, "{e:?}");
        }
    }

    #[test]
    fn invalid_config_is_exit_1() {
        let e = CliError::from(ConfigError::UnreachableThreshold(7));
        assert_eq!(e.exit_code(), 1);
    }

    #[test]
    fn write_failed_is_exit_1() {
        let e = CliError::WriteFailed {
            target: "out/duplicates.tsv".to_owned(),
            detail: "no such directory".to_owned(),
        };
        assert_eq!(e.exit_code(), 1);
    }

    // ── message content ──────────────────────────────────────────────────────

    #[test]
    fn file_not_found_message_contains_path() {
        let e = CliError::FileNotFound {
            path: PathBuf::from("catalog.tsv"),
        };
        let msg = e.message();
        assert!(msg.contains("catalog.tsv"), "message: {msg}");
        assert!(msg.contains("not found"), "message: {msg}");
    }

    #[test]
    fn file_too_large_with_actual_mentions_sizes() {
        let e = CliError::FileTooLarge {
            source: "big.tsv".to_owned(),
            limit: 1_000_000,
            actual: Some(2_000_000),
        };
        let msg = e.message();
        assert!(msg.contains("2000000"), "message: {msg}");
        assert!(msg.contains("1000000"), "message: {msg}");
    }

    #[test]
    fn file_too_large_without_actual_mentions_limit() {
        let e = CliError::FileTooLarge {
            source: "-".to_owned(),
            limit: 512,
            actual: None,
        };
        assert!(e.message().contains("512"));
    }

    #[test]
    fn malformed_catalog_message_has_line_number() {
        let e = CliError::MalformedCatalog {
            source: "movies.tsv".to_owned(),
            error: LoadError::WrongFieldCount { line: 17, found: 2 },
        };
        let msg = e.message();
        assert!(msg.contains("movies.tsv"), "message: {msg}");
        assert!(msg.contains("line 17"), "message: {msg}");
    }

    #[test]
    fn invalid_config_message_names_the_problem() {
        let msg = CliError::from(ConfigError::UnreachableThreshold(7)).message();
        assert!(msg.contains("threshold 7"), "message: {msg}");
    }

    #[test]
    fn display_matches_message() {
        let e = CliError::WriteFailed {
            target: "-".to_owned(),
            detail: "broken pipe".to_owned(),
        };
        assert_eq!(format!("{e}"), e.message());
    }

    #[test]
    fn error_trait_is_implemented() {
        let e: Box<dyn std::error::Error> = Box::new(CliError::StdinReadError {
            detail: "closed".to_owned(),
        });
        assert!(!e.to_string().is_empty());
    }
}
