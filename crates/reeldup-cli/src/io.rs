//! Catalog reading and report writing.
//!
//! `reeldup-core` never touches the filesystem; all I/O of the binary happens
//! here. Reads are bounded by `--max-file-size`: disk files are checked via
//! `std::fs::metadata` before any read, stdin is read through `Read::take`.
//! Input errors map to exit code 2, output errors to exit code 1.
use std::io::{ErrorKind, Read as _, Write as _};
use std::path::Path;

use crate::error::CliError;
use crate::{PathOrStdin, PathOrStdout};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Reads the entire contents of `source` into a `String`.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) when the source is missing, unreadable,
/// larger than `max_size`, or not valid UTF-8.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

/// Human-readable label for `source` in messages and logs.
pub fn source_label(source: &PathOrStdin) -> String {
    match source {
        PathOrStdin::Path(path) => path.display().to_string(),
        PathOrStdin::Stdin => "-".to_owned(),
    }
}

fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| read_error(&e, path))?
        .len();
    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }
    let bytes = std::fs::read(path).map_err(|e| read_error(&e, path))?;
    bytes_to_string(bytes, &path.display().to_string())
}

fn read_error(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}

/// Reads stdin, capped at `max_size` bytes.
///
/// A stream of exactly `max_size` bytes is probed for one more byte to tell
/// "at the limit" from "over the limit".
fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let mut handle = stdin.lock();
    let mut buf: Vec<u8> = Vec::new();

    (&mut handle)
        .take(max_size)
        .read_to_end(&mut buf)
        .map_err(|e| CliError::StdinReadError {
            detail: e.to_string(),
        })?;

    if buf.len() as u64 == max_size {
        let mut probe = [0u8; 1];
        let extra = handle
            .read(&mut probe)
            .map_err(|e| CliError::StdinReadError {
                detail: e.to_string(),
            })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            });
        }
    }

    bytes_to_string(buf, "-")
}

fn bytes_to_string(bytes: Vec<u8>, source_label: &str) -> Result<String, CliError> {
    String::from_utf8(bytes).map_err(|e| CliError::InvalidUtf8 {
        source: source_label.to_owned(),
        byte_offset: e.utf8_error().valid_up_to(),
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Human-readable label for `target` in messages and logs.
pub fn target_label(target: &PathOrStdout) -> String {
    match target {
        PathOrStdout::Path(path) => path.display().to_string(),
        PathOrStdout::Stdout => "-".to_owned(),
    }
}

/// Writes `contents` to `target`, replacing any existing file.
///
/// # Errors
///
/// Returns [`CliError::WriteFailed`] (exit code 1) on any I/O error.
pub fn write_output(target: &PathOrStdout, contents: &str) -> Result<(), CliError> {
    match target {
        PathOrStdout::Path(path) => {
            std::fs::write(path, contents).map_err(|e| CliError::WriteFailed {
                target: target_label(target),
                detail: e.to_string(),
            })
        }
        PathOrStdout::Stdout => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(contents.as_bytes())
                .and_then(|()| handle.flush())
                .map_err(|e| CliError::WriteFailed {
                    target: target_label(target),
                    detail: e.to_string(),
                })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use std::io::Write as _;
    use std::path::PathBuf;

    use super::*;

    fn temp_file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        f.write_all(contents).expect("write temp file");
        f
    }

    // ── read_input ───────────────────────────────────────────────────────────

    #[test]
    fn read_valid_catalog() {
        let content = "id\tyear\tlength\tgenres\tdirectors\tactors\n";
        let f = temp_file_with(content.as_bytes());
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let result = read_input(&source, 1024).expect("should read file");
        assert_eq!(result, content);
    }

    #[test]
    fn read_file_exactly_at_limit_succeeds() {
        let f = temp_file_with(b"hello");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let result = read_input(&source, 5).expect("should succeed at limit");
        assert_eq!(result, "hello");
    }

    #[test]
    fn read_file_over_limit_reports_actual_size() {
        let f = temp_file_with(b"hello world");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let err = read_input(&source, 4).expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
        match err {
            CliError::FileTooLarge {
                actual: Some(n), ..
            } => assert_eq!(n, 11),
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn read_invalid_utf8_returns_error_with_offset() {
        let mut data = b"tt1\t".to_vec();
        data.push(0xFF);
        let f = temp_file_with(&data);
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let err = read_input(&source, 1024).expect_err("should fail on bad UTF-8");
        match err {
            CliError::InvalidUtf8 { byte_offset, .. } => assert_eq!(byte_offset, 4),
            other => panic!("expected InvalidUtf8, got {other:?}"),
        }
    }

    #[test]
    fn read_nonexistent_file_returns_file_not_found() {
        let source = PathOrStdin::Path(PathBuf::from("/no/such/dir/movies.tsv"));
        let err = read_input(&source, 1024).expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn target_label_uses_dash_for_stdout() {
        assert_eq!(target_label(&PathOrStdout::Stdout), "-");
    }

    #[test]
    fn source_label_uses_dash_for_stdin() {
        assert_eq!(source_label(&PathOrStdin::Stdin), "-");
        assert_eq!(
            source_label(&PathOrStdin::Path(PathBuf::from("movies.tsv"))),
            "movies.tsv"
        );
    }

    // ── write_output ─────────────────────────────────────────────────────────

    #[test]
    fn write_output_replaces_file_contents() {
        let f = temp_file_with(b"stale contents that are longer\n");
        let target = PathOrStdout::Path(f.path().to_path_buf());
        write_output(&target, "a\tb\n").expect("write");
        let written = std::fs::read_to_string(f.path()).expect("read back");
        assert_eq!(written, "a\tb\n");
    }

    #[test]
    fn write_output_into_missing_directory_is_exit_1() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = PathOrStdout::Path(dir.path().join("missing").join("out.tsv"));
        let err = write_output(&target, "").expect_err("should fail");
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, CliError::WriteFailed { .. }));
    }
}
