//! Clap CLI definition: root struct and shared argument types.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use reeldup_core::{DedupConfig, LoadConfig, RuntimeWindow, ToleranceBand};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output destination: a filesystem path or the stdout sentinel `"-"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOrStdout {
    /// Write to standard output.
    Stdout,
    /// Write (create or truncate) the given file.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdout {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdout::Stdout)
        } else {
            Ok(PathOrStdout::Path(PathBuf::from(s)))
        }
    }
}

/// Layout of the duplicate report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `ref<TAB>dup` line per duplicate, no header (default).
    Tsv,
    /// One JSON object per equivalence class, one class per line.
    Json,
}

/// Runtime tolerance preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Tolerance {
    /// `0.95 .. 1.05` of each runtime (default).
    Linear,
    /// `1.95/2.05 .. 2.05/1.95`, reciprocal bounds.
    Reciprocal,
}

impl Tolerance {
    /// The band this preset stands for.
    pub fn band(self) -> ToleranceBand {
        match self {
            Self::Linear => ToleranceBand::LINEAR,
            Self::Reciprocal => ToleranceBand::RECIPROCAL,
        }
    }
}

/// Accepts a single ASCII character, or `tab` / `\t` for the tab character.
fn parse_delimiter(s: &str) -> Result<u8, String> {
    if s == "tab" || s == "\\t" {
        return Ok(b'\t');
    }
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!(
            "delimiter must be a single ASCII character or `tab`, got {s:?}"
        )),
    }
}

/// Root CLI struct for the `reeldup` binary.
#[derive(Parser, Debug)]
#[command(
    name = "reeldup",
    version,
    about = "Find duplicate entries in a movie catalog",
    long_about = "Reads a delimiter-separated movie catalog, groups records that describe\n\
                  the same movie, and writes one `ref<TAB>dup` line per duplicate, where\n\
                  `ref` is the least id of its group."
)]
pub struct Cli {
    /// Catalog to read, or `-` for stdin.
    #[arg(long, value_name = "FILE", env = "REELDUP_READ", default_value = "movies.tsv")]
    pub read: PathOrStdin,

    /// Where to write the duplicate report, or `-` for stdout.
    #[arg(long, value_name = "FILE", env = "REELDUP_SAVE", default_value = "duplicates.tsv")]
    pub save: PathOrStdout,

    /// Field separator of the catalog (`tab` or a single ASCII character).
    #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Runtime tolerance preset.
    #[arg(long, value_enum, default_value = "linear")]
    pub tolerance: Tolerance,

    /// Minimum combined director + actor score for a match (0-4).
    #[arg(long, default_value = "3")]
    pub name_threshold: u8,

    /// Compare only runtime-sorted neighbours, in slices of N ids.
    ///
    /// Given without a value, slices hold 20 ids. Off by default: every
    /// candidate bucket is scanned in full.
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "20")]
    pub runtime_window: Option<usize>,

    /// Step between consecutive runtime slices (default: half the window).
    #[arg(long, value_name = "N", requires = "runtime_window")]
    pub window_stride: Option<usize>,

    /// Warn about groups with more records than this.
    #[arg(long, value_name = "N", default_value = "50")]
    pub group_size_limit: usize,

    /// Report layout.
    #[arg(long, short = 'f', value_enum, default_value = "tsv")]
    pub format: OutputFormat,

    /// Print run counters as a JSON object on stderr.
    #[arg(long)]
    pub stats: bool,

    /// Maximum input size in bytes.
    ///
    /// Can also be set via the `REELDUP_MAX_FILE_SIZE` environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(long, env = "REELDUP_MAX_FILE_SIZE", default_value = "268435456")]
    pub max_file_size: u64,

    /// Only log errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log per-window progress (incompatible with `--quiet`).
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Cli {
    /// Loader settings derived from the flags.
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            delimiter: self.delimiter,
            tolerance: self.tolerance.band(),
            ..LoadConfig::default()
        }
    }

    /// Matching settings derived from the flags. Not validated here.
    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            name_threshold: self.name_threshold,
            runtime_window: self.runtime_window.map(|size| RuntimeWindow {
                size,
                stride: self.window_stride.unwrap_or((size / 2).max(1)),
            }),
            group_size_limit: self.group_size_limit,
        }
    }

    /// Log filter used when `--verbose`/`--quiet` is given, or `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "reeldup=debug,reeldup_core=debug"
        } else if self.quiet {
            "error"
        } else {
            "reeldup=info,reeldup_core=info"
        }
    }

    /// Returns `true` if the verbosity was chosen explicitly on the command line.
    pub fn verbosity_overridden(&self) -> bool {
        self.verbose || self.quiet
    }
}
