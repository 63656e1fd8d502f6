//! Movie records and the in-memory record store.
//!
//! A [`MovieRecord`] is immutable once built: its runtime tolerance bounds are
//! computed in [`MovieRecord::new`] and never recomputed. The [`RecordStore`]
//! owns every record of a run, keyed and ordered by [`MovieId`].
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::newtypes::{GenreCode, MovieId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing records or filling the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// Runtime must be a positive number of minutes.
    #[error("record {id}: length must be positive, got {length}")]
    NonPositiveLength {
        /// Offending record.
        id: MovieId,
        /// The rejected runtime.
        length: i64,
    },
    /// Runtime does not fit the record's `u32` minutes field.
    #[error("record {id}: length {length} exceeds the maximum of {max}", max = u32::MAX)]
    LengthOutOfRange {
        /// Offending record.
        id: MovieId,
        /// The rejected runtime.
        length: i64,
    },
    /// The same id was inserted twice.
    #[error("duplicate record id {0}")]
    DuplicateId(MovieId),
    /// The tolerance band does not straddle 1.
    #[error("invalid tolerance band: need 0 < low < 1 < high, got low={low}, high={high}")]
    InvalidBand {
        /// Lower multiplier.
        low: f64,
        /// Upper multiplier.
        high: f64,
    },
}

// ---------------------------------------------------------------------------
// ToleranceBand
// ---------------------------------------------------------------------------

/// Multiplicative runtime tolerance `(low, high)` with `0 < low < 1 < high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    low: f64,
    high: f64,
}

impl ToleranceBand {
    /// `0.95 .. 1.05`: five percent either side of the runtime.
    pub const LINEAR: Self = Self {
        low: 0.95,
        high: 1.05,
    };

    /// `1.95/2.05 .. 2.05/1.95`: bounds are reciprocals, so the accepted
    /// runtime ratio is the same whichever record is taken as reference.
    pub const RECIPROCAL: Self = Self {
        low: 1.95 / 2.05,
        high: 2.05 / 1.95,
    };

    /// Builds a band, rejecting values that would break `min < length < max`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidBand`] unless `0 < low < 1 < high` and
    /// both values are finite.
    pub fn new(low: f64, high: f64) -> Result<Self, RecordError> {
        let finite = low.is_finite() && high.is_finite();
        if finite && 0.0 < low && low < 1.0 && 1.0 < high {
            Ok(Self { low, high })
        } else {
            Err(RecordError::InvalidBand { low, high })
        }
    }

    /// Lower multiplier.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper multiplier.
    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for ToleranceBand {
    fn default() -> Self {
        Self::LINEAR
    }
}

// ---------------------------------------------------------------------------
// MovieRecord
// ---------------------------------------------------------------------------

/// One catalog row with its normalised attributes.
///
/// An empty `directors` or `actors` set means "unknown". The genre set is never
/// empty: a record without genres is filed under [`GenreCode::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    id: MovieId,
    year: i32,
    length: u32,
    genres: BTreeSet<GenreCode>,
    directors: BTreeSet<String>,
    actors: BTreeSet<String>,
    min_length: f64,
    max_length: f64,
}

impl MovieRecord {
    /// Builds a record and derives its runtime bounds from `band`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NonPositiveLength`] when `length <= 0` and
    /// [`RecordError::LengthOutOfRange`] when it exceeds `u32::MAX`.
    pub fn new(
        id: MovieId,
        year: i32,
        length: i64,
        genres: BTreeSet<GenreCode>,
        directors: BTreeSet<String>,
        actors: BTreeSet<String>,
        band: ToleranceBand,
    ) -> Result<Self, RecordError> {
        let length = match u32::try_from(length) {
            Ok(l) if l > 0 => l,
            Ok(_) => return Err(RecordError::NonPositiveLength { id, length }),
            Err(_) if length < 0 => return Err(RecordError::NonPositiveLength { id, length }),
            Err(_) => return Err(RecordError::LengthOutOfRange { id, length }),
        };
        let genres = if genres.is_empty() {
            BTreeSet::from([GenreCode::Unknown])
        } else {
            genres
        };
        let minutes = f64::from(length);
        Ok(Self {
            id,
            year,
            length,
            genres,
            directors,
            actors,
            min_length: minutes * band.low(),
            max_length: minutes * band.high(),
        })
    }

    /// Record id.
    pub fn id(&self) -> &MovieId {
        &self.id
    }

    /// Release year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Runtime in minutes.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Genre codes, never empty.
    pub fn genres(&self) -> &BTreeSet<GenreCode> {
        &self.genres
    }

    /// Director name tokens; empty when unknown.
    pub fn directors(&self) -> &BTreeSet<String> {
        &self.directors
    }

    /// Actor name tokens; empty when unknown.
    pub fn actors(&self) -> &BTreeSet<String> {
        &self.actors
    }

    /// Lower runtime bound (exclusive).
    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    /// Upper runtime bound (exclusive).
    pub fn max_length(&self) -> f64 {
        self.max_length
    }
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// All records of one run, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<MovieId, MovieRecord>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if a record with the same id is
    /// already present; the store is left unchanged.
    pub fn insert(&mut self, record: MovieRecord) -> Result<(), RecordError> {
        if self.records.contains_key(record.id()) {
            return Err(RecordError::DuplicateId(record.id().clone()));
        }
        self.records.insert(record.id().clone(), record);
        Ok(())
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &MovieId) -> Option<&MovieRecord> {
        self.records.get(id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record has been loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> {
        self.records.values()
    }
}

impl FromIterator<MovieRecord> for RecordStore {
    /// Collects records; a repeated id keeps the first occurrence.
    fn from_iter<I: IntoIterator<Item = MovieRecord>>(iter: I) -> Self {
        let mut records = BTreeMap::new();
        for record in iter {
            records.entry(record.id().clone()).or_insert(record);
        }
        Self { records }
    }
}
