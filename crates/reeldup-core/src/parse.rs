//! Catalog loader: turns delimiter-separated text into a [`RecordStore`].
//!
//! Layout: one header line (skipped), then one record per line with the
//! fields `id, year, length, genres, directors, actors`. The three list
//! fields are comma-separated; the literal `\N` stands for "unknown" and is
//! loaded as the empty set. Loading is fail-fast: the first malformed line
//! aborts the whole load and no partial store is returned.
//!
//! Rows are tokenized by the `csv` crate with quoting disabled, so a `"`
//! inside a title or name is kept verbatim. The reader runs in flexible mode;
//! the field count is checked here to report it with the line number.
//!
//! This module performs no I/O; callers hand it the decoded file contents.
use std::collections::BTreeSet;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};

use crate::newtypes::{GenreCode, MovieId, NewtypeError, UNKNOWN_TOKEN};
use crate::record::{MovieRecord, RecordError, RecordStore, ToleranceBand};

/// Number of fields every data line must carry.
pub const FIELD_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// LoadConfig
// ---------------------------------------------------------------------------

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Field separator, a single ASCII byte. Default: tab.
    pub delimiter: u8,
    /// Separator inside the genre/director/actor lists. Default: `,`.
    pub list_separator: char,
    /// Runtime tolerance applied when deriving each record's bounds.
    pub tolerance: ToleranceBand,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            list_separator: ',',
            tolerance: ToleranceBand::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// A catalog line that could not be turned into a record.
///
/// Every variant carries the 1-based line number in the input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// The tokenizer could not read the line.
    #[error("line {line}: {detail}")]
    Unreadable {
        /// Line number.
        line: usize,
        /// Reader error text.
        detail: String,
    },
    /// The line does not have exactly [`FIELD_COUNT`] fields.
    #[error("line {line}: expected {FIELD_COUNT} fields, found {found}")]
    WrongFieldCount {
        /// Line number.
        line: usize,
        /// Number of fields present.
        found: usize,
    },
    /// `year` or `length` is not an integer.
    #[error("line {line}: field `{field}` is not an integer: {value:?}")]
    InvalidInteger {
        /// Line number.
        line: usize,
        /// Field name.
        field: &'static str,
        /// Raw value.
        value: String,
    },
    /// The id or a genre token failed validation.
    #[error("line {line}: {source}")]
    InvalidToken {
        /// Line number.
        line: usize,
        /// Validation failure.
        source: NewtypeError,
    },
    /// The record itself was rejected (bad length, repeated id).
    #[error("line {line}: {source}")]
    InvalidRecord {
        /// Line number.
        line: usize,
        /// Record-level failure.
        source: RecordError,
    },
}

impl LoadError {
    /// The 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::Unreadable { line, .. }
            | Self::WrongFieldCount { line, .. }
            | Self::InvalidInteger { line, .. }
            | Self::InvalidToken { line, .. }
            | Self::InvalidRecord { line, .. } => *line,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parses a whole catalog.
///
/// Blank lines are ignored. A text holding only a header, or nothing at all,
/// yields an empty store.
///
/// # Errors
///
/// Returns the first [`LoadError`] encountered.
pub fn parse_catalog(text: &str, config: &LoadConfig) -> Result<RecordStore, LoadError> {
    let mut reader = reader_builder(config)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let mut lines = LineCounter::new(text);
    let mut store = RecordStore::new();
    let mut row = StringRecord::new();
    while reader
        .read_record(&mut row)
        .map_err(|e| LoadError::Unreadable {
            line: lines.line_at(e.position()),
            detail: e.to_string(),
        })?
    {
        let line_no = lines.line_at(row.position());
        if is_blank(&row) {
            continue;
        }
        let record = parse_fields(&row, line_no, config)?;
        store
            .insert(record)
            .map_err(|source| LoadError::InvalidRecord {
                line: line_no,
                source,
            })?;
    }
    tracing::debug!(records = store.len(), "catalog parsed");
    Ok(store)
}

/// Parses one data line, reporting errors against `line_no`.
///
/// # Errors
///
/// See [`LoadError`].
pub fn parse_line(line: &str, line_no: usize, config: &LoadConfig) -> Result<MovieRecord, LoadError> {
    let mut reader = reader_builder(config)
        .has_headers(false)
        .from_reader(line.as_bytes());
    let mut row = StringRecord::new();
    let read = reader.read_record(&mut row).map_err(|e| LoadError::Unreadable {
        line: line_no,
        detail: e.to_string(),
    })?;
    if !read {
        return Err(LoadError::WrongFieldCount {
            line: line_no,
            found: 0,
        });
    }
    parse_fields(&row, line_no, config)
}

fn reader_builder(config: &LoadConfig) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(config.delimiter)
        .quoting(false)
        .flexible(true);
    builder
}

/// Maps reader positions to 1-based line numbers.
///
/// A record's position is taken before the reader skips empty lines, so the
/// offset is first advanced past any line terminators.
struct LineCounter<'t> {
    bytes: &'t [u8],
    offset: usize,
    line: usize,
}

impl<'t> LineCounter<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: Option<&csv::Position>) -> usize {
        let Some(position) = position else {
            return self.line;
        };
        let start = usize::try_from(position.byte())
            .map_or(self.bytes.len(), |b| b.min(self.bytes.len()));
        let rest = self.bytes.get(start..).unwrap_or_default();
        let start = start + rest.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count();
        if start > self.offset {
            let crossed = self.bytes.get(self.offset..start).unwrap_or_default();
            self.line += crossed.iter().filter(|&&b| b == b'\n').count();
            self.offset = start;
        }
        self.line
    }
}

/// A whitespace-only line reaches us as a single blank field.
fn is_blank(row: &StringRecord) -> bool {
    row.len() <= 1 && row.iter().all(|f| f.trim().is_empty())
}

fn parse_fields(row: &StringRecord, line_no: usize, config: &LoadConfig) -> Result<MovieRecord, LoadError> {
    let fields: Vec<&str> = row.iter().collect();
    let [id, year, length, genres, directors, actors] = fields[..] else {
        return Err(LoadError::WrongFieldCount {
            line: line_no,
            found: fields.len(),
        });
    };

    let invalid_token = |source| LoadError::InvalidToken {
        line: line_no,
        source,
    };

    let id = MovieId::try_from(id.trim()).map_err(invalid_token)?;
    let year = parse_int(year, "year", line_no)?;
    let year = i32::try_from(year).map_err(|_| LoadError::InvalidInteger {
        line: line_no,
        field: "year",
        value: year.to_string(),
    })?;
    let length = parse_int(length, "length", line_no)?;

    let genres = split_list(genres, config.list_separator)
        .into_iter()
        .map(|g| GenreCode::try_from(g.as_str()))
        .collect::<Result<BTreeSet<_>, _>>()
        .map_err(invalid_token)?;

    MovieRecord::new(
        id,
        year,
        length,
        genres,
        split_list(directors, config.list_separator),
        split_list(actors, config.list_separator),
        config.tolerance,
    )
    .map_err(|source| LoadError::InvalidRecord {
        line: line_no,
        source,
    })
}

fn parse_int(raw: &str, field: &'static str, line: usize) -> Result<i64, LoadError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| LoadError::InvalidInteger {
            line,
            field,
            value: raw.to_owned(),
        })
}

/// Splits a list field into trimmed, non-empty tokens; `\N` yields the empty set.
fn split_list(raw: &str, separator: char) -> BTreeSet<String> {
    let raw = raw.trim();
    if raw == UNKNOWN_TOKEN {
        return BTreeSet::new();
    }
    raw.split(separator)
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != UNKNOWN_TOKEN)
        .map(str::to_owned)
        .collect()
}
