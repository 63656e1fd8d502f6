//! Candidate generation: restricts pairwise comparison to plausible buckets.
//!
//! Years are visited in ascending order. Each year forms one window whose
//! eligible ids are its own records plus, when the preceding catalog year is
//! exactly one earlier, that year's records. A record from year `Y` therefore
//! meets records from `Y - 1` and `Y`; `Y + 1` is covered by the next window.
//!
//! Within a window, one bucket is produced per genre code (the unknown code
//! included) holding `eligible ∩ (genre ∪ unknown)`. Unknown-genre records
//! thus land in every bucket of their window.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::index::CatalogIndex;
use crate::newtypes::{GenreCode, MovieId};
use crate::record::RecordStore;

// ---------------------------------------------------------------------------
// YearWindow
// ---------------------------------------------------------------------------

/// The years whose records are compared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    /// The year on the "current" side of the window.
    pub year: i32,
    /// `Some(year - 1)` when that year is present in the catalog.
    pub previous: Option<i32>,
}

impl YearWindow {
    /// Union of the window's year id sets.
    pub fn eligible_ids(&self, index: &CatalogIndex) -> BTreeSet<MovieId> {
        let mut ids = BTreeSet::new();
        for year in self.previous.into_iter().chain(Some(self.year)) {
            if let Some(year_ids) = index.ids_for_year(year) {
                ids.extend(year_ids.iter().cloned());
            }
        }
        ids
    }
}

/// Returns one window per distinct catalog year, ascending.
///
/// The first year has no predecessor and forms a window on its own. Every
/// later year is paired with its predecessor only when the two are adjacent.
pub fn year_windows(index: &CatalogIndex) -> Vec<YearWindow> {
    let years: Vec<i32> = index.years().keys().copied().collect();
    let Some(&first) = years.first() else {
        return Vec::new();
    };

    let mut windows = Vec::with_capacity(years.len());
    windows.push(YearWindow {
        year: first,
        previous: None,
    });
    for pair in years.windows(2) {
        let (prev, year) = (pair[0], pair[1]);
        let previous = (i64::from(prev) == i64::from(year) - 1).then_some(prev);
        windows.push(YearWindow { year, previous });
    }
    windows
}

// ---------------------------------------------------------------------------
// CandidateBucket
// ---------------------------------------------------------------------------

/// A set of ids whose unordered pairs are match candidates.
///
/// Pairs whose members both predate `year` were already offered by the
/// previous window and are skipped by the matcher, except when buckets are
/// sliced by runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBucket {
    /// The window's current year.
    pub year: i32,
    /// Genre the bucket was cut for.
    pub genre: GenreCode,
    /// Member ids, ascending unless re-sorted by runtime.
    pub ids: Vec<MovieId>,
}

impl CandidateBucket {
    /// Number of unordered pairs in the bucket.
    pub fn pair_count(&self) -> usize {
        let n = self.ids.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Cuts one bucket per genre for `window`, skipping buckets under two ids.
pub fn buckets_for_window(index: &CatalogIndex, window: &YearWindow) -> Vec<CandidateBucket> {
    let eligible = window.eligible_ids(index);
    if eligible.len() < 2 {
        return Vec::new();
    }
    let empty = BTreeSet::new();
    let unknown = index.unknown_genre_ids().unwrap_or(&empty);

    index
        .genres()
        .iter()
        .filter_map(|(genre, genre_ids)| {
            let ids: Vec<MovieId> = eligible
                .iter()
                .filter(|id| genre_ids.contains(*id) || unknown.contains(*id))
                .cloned()
                .collect();
            (ids.len() >= 2).then(|| CandidateBucket {
                year: window.year,
                genre: genre.clone(),
                ids,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Runtime sub-bucketing
// ---------------------------------------------------------------------------

/// Overlapping runtime-sorted slices used to cap per-bucket work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeWindow {
    /// Maximum ids per slice.
    pub size: usize,
    /// Offset between consecutive slice starts.
    pub stride: usize,
}

impl Default for RuntimeWindow {
    fn default() -> Self {
        Self { size: 20, stride: 10 }
    }
}

impl RuntimeWindow {
    /// Returns `true` when slices are at least pairs and consecutive slices
    /// overlap or touch (`1 <= stride <= size`).
    pub fn is_valid(&self) -> bool {
        self.size >= 2 && self.stride >= 1 && self.stride <= self.size
    }
}

/// Sorts `bucket` by `(length, id)` and splits it into overlapping slices.
///
/// Buckets no larger than `window.size` are returned whole. Only pairs that
/// share a slice are compared afterwards, so records far apart in runtime
/// order are never tested.
pub fn split_by_runtime(
    bucket: CandidateBucket,
    store: &RecordStore,
    window: RuntimeWindow,
) -> Vec<CandidateBucket> {
    if bucket.ids.len() <= window.size || !window.is_valid() {
        return vec![bucket];
    }
    let CandidateBucket {
        year,
        genre,
        mut ids,
    } = bucket;
    ids.sort_by_cached_key(|id| (store.get(id).map_or(0, |r| r.length()), id.clone()));

    let mut slices = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + window.size).min(ids.len());
        slices.push(CandidateBucket {
            year,
            genre: genre.clone(),
            ids: ids[start..end].to_vec(),
        });
        if end == ids.len() {
            break;
        }
        start += window.stride;
    }
    slices
}
