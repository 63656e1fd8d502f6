//! Pairwise matching of candidate records.
//!
//! Two records match when both criteria hold:
//!
//! 1. **Runtime band**: each runtime lies strictly inside the other record's
//!    `(min_length, max_length)` interval. Checking both directions keeps the
//!    predicate symmetric.
//! 2. **Name overlap**: `name_score(directors) + name_score(actors)` reaches
//!    the configured threshold (default 3).
//!
//! All predicates in this module are pure and symmetric in their arguments.
use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::candidates::CandidateBucket;
use crate::newtypes::MovieId;
use crate::record::{MovieRecord, RecordStore};

/// Default minimum combined name score for a match.
pub const DEFAULT_NAME_THRESHOLD: u8 = 3;

// ---------------------------------------------------------------------------
// MatchEdge
// ---------------------------------------------------------------------------

/// An undirected "same movie" relation between two distinct ids.
///
/// The ids are stored in ascending order so that `(a, b)` and `(b, a)` build
/// equal edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchEdge {
    low: MovieId,
    high: MovieId,
}

impl MatchEdge {
    /// Builds an edge, normalising the id order.
    pub fn new(a: MovieId, b: MovieId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The smaller id.
    pub fn low(&self) -> &MovieId {
        &self.low
    }

    /// The larger id.
    pub fn high(&self) -> &MovieId {
        &self.high
    }

    /// Returns `true` when both ends are the same id.
    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

// ---------------------------------------------------------------------------
// Scoring predicates
// ---------------------------------------------------------------------------

/// Scores agreement between two name-token sets.
///
/// - both empty: 0, nothing is known either way
/// - exactly one empty: 1, the unknown side is a wildcard
/// - one a subset of the other (equal included): 2
/// - both non-empty and neither a subset: 0, the crews conflict
pub fn name_score(a: &BTreeSet<String>, b: &BTreeSet<String>) -> u8 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 0,
        (true, false) | (false, true) => 1,
        (false, false) => {
            if a.is_subset(b) || b.is_subset(a) {
                2
            } else {
                0
            }
        }
    }
}

/// Returns `true` when each runtime lies inside the other record's band.
pub fn runtime_compatible(a: &MovieRecord, b: &MovieRecord) -> bool {
    let (la, lb) = (f64::from(a.length()), f64::from(b.length()));
    a.min_length() < lb && lb < a.max_length() && b.min_length() < la && la < b.max_length()
}

/// Combined director and actor score.
pub fn combined_name_score(a: &MovieRecord, b: &MovieRecord) -> u8 {
    name_score(a.directors(), b.directors()) + name_score(a.actors(), b.actors())
}

// ---------------------------------------------------------------------------
// PairSet
// ---------------------------------------------------------------------------

/// Unordered pairs already tested in the current year window.
///
/// A pair may fall into several genre buckets of one window; this set keeps
/// the matcher from scoring it twice.
#[derive(Debug, Default)]
pub struct PairSet {
    seen: HashSet<(MovieId, MovieId)>,
}

impl PairSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pair; returns `false` if it had been recorded before.
    pub fn insert(&mut self, a: &MovieId, b: &MovieId) -> bool {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.seen.insert(key)
    }

    /// Number of distinct pairs recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if no pair has been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PairMatcher
// ---------------------------------------------------------------------------

/// Work done on one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketStats {
    /// Pairs scored.
    pub candidates: usize,
    /// Pairs that matched.
    pub matches: usize,
}

impl std::ops::AddAssign for BucketStats {
    fn add_assign(&mut self, rhs: Self) {
        self.candidates += rhs.candidates;
        self.matches += rhs.matches;
    }
}

/// Scores candidate pairs against a name threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairMatcher {
    name_threshold: u8,
    skip_previous_year: bool,
}

impl Default for PairMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_THRESHOLD)
    }
}

impl PairMatcher {
    /// Creates a matcher requiring `name_threshold` combined name points.
    pub fn new(name_threshold: u8) -> Self {
        Self {
            name_threshold,
            skip_previous_year: true,
        }
    }

    /// Also scores pairs whose two records both predate the bucket year.
    ///
    /// Required once buckets are sliced by runtime: the previous window
    /// sliced a different population and may have kept such a pair apart.
    pub fn rescanning_previous_year(mut self) -> Self {
        self.skip_previous_year = false;
        self
    }

    fn offered_before(&self, a: &MovieRecord, b: &MovieRecord, year: i32) -> bool {
        self.skip_previous_year && a.year() < year && b.year() < year
    }

    /// Returns `true` when `a` and `b` describe the same movie.
    pub fn is_match(&self, a: &MovieRecord, b: &MovieRecord) -> bool {
        a.id() != b.id()
            && runtime_compatible(a, b)
            && combined_name_score(a, b) >= self.name_threshold
    }

    /// Tests every unordered pair of `bucket` not yet in `seen`.
    ///
    /// Pairs whose two records both predate `bucket.year` are skipped, since
    /// the previous window already offered them, unless the matcher was built
    /// with [`PairMatcher::rescanning_previous_year`]. Each passing pair is
    /// handed to `sink`.
    pub fn match_bucket<F>(
        &self,
        store: &RecordStore,
        bucket: &CandidateBucket,
        seen: &mut PairSet,
        mut sink: F,
    ) -> BucketStats
    where
        F: FnMut(MatchEdge),
    {
        let records = resolve(store, bucket);
        let mut stats = BucketStats::default();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if self.offered_before(a, b, bucket.year) {
                    continue;
                }
                if !seen.insert(a.id(), b.id()) {
                    continue;
                }
                stats.candidates += 1;
                if self.is_match(a, b) {
                    stats.matches += 1;
                    sink(MatchEdge::new(a.id().clone(), b.id().clone()));
                }
            }
        }
        stats
    }

    /// Tests every qualifying pair of `bucket` without cross-bucket
    /// de-duplication and returns the matches.
    ///
    /// Used by the parallel path, where buckets cannot share a [`PairSet`].
    pub fn collect_bucket(
        &self,
        store: &RecordStore,
        bucket: &CandidateBucket,
    ) -> (Vec<MatchEdge>, BucketStats) {
        let records = resolve(store, bucket);
        let mut stats = BucketStats::default();
        let mut edges = Vec::new();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if self.offered_before(a, b, bucket.year) {
                    continue;
                }
                stats.candidates += 1;
                if self.is_match(a, b) {
                    stats.matches += 1;
                    edges.push(MatchEdge::new(a.id().clone(), b.id().clone()));
                }
            }
        }
        (edges, stats)
    }
}

/// Looks up the bucket's records; ids missing from the store are skipped.
fn resolve<'s>(store: &'s RecordStore, bucket: &CandidateBucket) -> Vec<&'s MovieRecord> {
    bucket.ids.iter().filter_map(|id| store.get(id)).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::newtypes::GenreCode;
    use crate::test_helpers::{movie, movie_id, names, store};

    // -- name_score ----------------------------------------------------------

    #[test]
    fn name_score_table() {
        let empty = names(&[]);
        let smith = names(&["smith"]);
        let smith_lee = names(&["smith", "lee"]);
        let jones = names(&["jones"]);

        assert_eq!(name_score(&empty, &empty), 0, "no information");
        assert_eq!(name_score(&empty, &smith), 1, "wildcard");
        assert_eq!(name_score(&smith, &empty), 1, "wildcard");
        assert_eq!(name_score(&smith, &smith), 2, "equal sets");
        assert_eq!(name_score(&smith, &smith_lee), 2, "subset");
        assert_eq!(name_score(&smith_lee, &smith), 2, "superset");
        assert_eq!(name_score(&smith, &jones), 0, "conflict");
        assert_eq!(name_score(&smith_lee, &names(&["smith", "kim"])), 0, "partial overlap");
    }

    // -- runtime_compatible --------------------------------------------------

    #[test]
    fn runtime_band_is_exclusive_and_two_sided() {
        let base = movie("a", 2000, 100, &[], &[], &[]);
        let inside = movie("b", 2000, 104, &[], &[], &[]);
        let outside = movie("c", 2000, 106, &[], &[], &[]);
        assert!(runtime_compatible(&base, &inside));
        assert!(runtime_compatible(&inside, &base));
        assert!(!runtime_compatible(&base, &outside));
        assert!(!runtime_compatible(&outside, &base));
    }

    #[test]
    fn runtime_band_rejects_one_sided_fit() {
        // 1000 lies inside 1051's band (998.45, 1103.55), but 1051 is above
        // 1000's upper bound of 1050.
        let a = movie("a", 2000, 1000, &[], &[], &[]);
        let b = movie("b", 2000, 1051, &[], &[], &[]);
        assert!(b.min_length() < f64::from(a.length()));
        assert!(!runtime_compatible(&a, &b));
        assert!(!runtime_compatible(&b, &a));
    }

    // -- PairMatcher::is_match -----------------------------------------------

    #[test]
    fn director_match_with_unknown_actors_is_below_threshold() {
        let a = movie("A", 2000, 120, &["Drama"], &["smith"], &[]);
        let b = movie("B", 2000, 121, &["Drama"], &["smith"], &[]);
        assert_eq!(combined_name_score(&a, &b), 2);
        assert!(!PairMatcher::default().is_match(&a, &b));
    }

    #[test]
    fn director_and_actor_subset_match() {
        let a = movie("A", 2000, 120, &["Drama"], &["smith"], &["jones"]);
        let b = movie("B", 2000, 121, &["Drama"], &["smith"], &["jones", "lee"]);
        assert_eq!(combined_name_score(&a, &b), 4);
        assert!(PairMatcher::default().is_match(&a, &b));
    }

    #[test]
    fn strong_plus_wildcard_reaches_threshold() {
        let a = movie("A", 2000, 120, &[], &["smith"], &["jones"]);
        let b = movie("B", 2000, 120, &[], &["smith"], &[]);
        assert_eq!(combined_name_score(&a, &b), 3);
        assert!(PairMatcher::default().is_match(&a, &b));
    }

    #[test]
    fn two_wildcards_do_not_match() {
        let a = movie("A", 2000, 120, &[], &["smith"], &["jones"]);
        let b = movie("B", 2000, 120, &[], &[], &[]);
        assert_eq!(combined_name_score(&a, &b), 2);
        assert!(!PairMatcher::default().is_match(&a, &b));
    }

    #[test]
    fn conflicting_directors_never_match() {
        let a = movie("A", 2000, 120, &[], &["smith"], &["jones"]);
        let b = movie("B", 2000, 120, &[], &["kim"], &["jones"]);
        assert!(!PairMatcher::default().is_match(&a, &b));
    }

    #[test]
    fn threshold_is_configurable() {
        let a = movie("A", 2000, 120, &[], &["smith"], &[]);
        let b = movie("B", 2000, 120, &[], &["smith"], &[]);
        assert!(PairMatcher::new(2).is_match(&a, &b));
        assert!(!PairMatcher::new(3).is_match(&a, &b));
    }

    #[test]
    fn record_never_matches_itself() {
        let a = movie("A", 2000, 120, &[], &["smith"], &["jones"]);
        assert!(!PairMatcher::default().is_match(&a, &a));
    }

    // -- MatchEdge -----------------------------------------------------------

    #[test]
    fn edge_is_order_normalised() {
        let ab = MatchEdge::new(movie_id("a"), movie_id("b"));
        let ba = MatchEdge::new(movie_id("b"), movie_id("a"));
        assert_eq!(ab, ba);
        assert_eq!(ab.low().as_str(), "a");
        assert_eq!(ab.high().as_str(), "b");
        assert!(!ab.is_loop());
    }

    // -- match_bucket --------------------------------------------------------

    fn bucket(year: i32, ids: &[&str]) -> CandidateBucket {
        CandidateBucket {
            year,
            genre: GenreCode::Unknown,
            ids: ids.iter().map(|s| movie_id(s)).collect(),
        }
    }

    #[test]
    fn match_bucket_emits_passing_pairs_once() {
        let store = store(vec![
            movie("a", 2000, 120, &[], &["smith"], &["jones"]),
            movie("b", 2000, 121, &[], &["smith"], &["jones", "lee"]),
            movie("c", 2000, 200, &[], &["smith"], &["jones"]),
        ]);
        let matcher = PairMatcher::default();
        let mut seen = PairSet::new();
        let mut edges = Vec::new();

        let stats = matcher.match_bucket(&store, &bucket(2000, &["a", "b", "c"]), &mut seen, |e| {
            edges.push(e);
        });
        assert_eq!(stats, BucketStats { candidates: 3, matches: 1 });
        assert_eq!(edges, vec![MatchEdge::new(movie_id("a"), movie_id("b"))]);

        // The same pairs arriving through another genre bucket are skipped.
        let again = matcher.match_bucket(&store, &bucket(2000, &["a", "b"]), &mut seen, |e| {
            edges.push(e);
        });
        assert_eq!(again, BucketStats::default());
        assert_eq!(edges.len(), 1);
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn match_bucket_skips_pairs_from_previous_year_only() {
        let store = store(vec![
            movie("a", 1999, 120, &[], &["smith"], &["jones"]),
            movie("b", 1999, 120, &[], &["smith"], &["jones"]),
            movie("c", 2000, 120, &[], &["smith"], &["jones"]),
        ]);
        let mut seen = PairSet::new();
        let mut edges = Vec::new();
        let stats = PairMatcher::default().match_bucket(
            &store,
            &bucket(2000, &["a", "b", "c"]),
            &mut seen,
            |e| edges.push(e),
        );
        assert_eq!(stats.candidates, 2, "(a, b) belongs to the 1999 window");
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn rescanning_matcher_scores_previous_year_pairs() {
        let store = store(vec![
            movie("a", 1999, 120, &[], &["smith"], &["jones"]),
            movie("b", 1999, 120, &[], &["smith"], &["jones"]),
            movie("c", 2000, 300, &[], &["kim"], &["lee"]),
        ]);
        let b = bucket(2000, &["a", "b", "c"]);
        let matcher = PairMatcher::default().rescanning_previous_year();

        let mut edges = Vec::new();
        let stats = matcher.match_bucket(&store, &b, &mut PairSet::new(), |e| edges.push(e));
        assert_eq!(stats, BucketStats { candidates: 3, matches: 1 });
        assert_eq!(edges, vec![MatchEdge::new(movie_id("a"), movie_id("b"))]);

        let (collected, collected_stats) = matcher.collect_bucket(&store, &b);
        assert_eq!(collected, edges);
        assert_eq!(collected_stats, stats);
    }

    #[test]
    fn collect_bucket_agrees_with_match_bucket() {
        let store = store(vec![
            movie("a", 2000, 120, &[], &["smith"], &["jones"]),
            movie("b", 2000, 121, &[], &["smith"], &["jones", "lee"]),
            movie("c", 2000, 119, &[], &[], &["jones"]),
        ]);
        let b = bucket(2000, &["a", "b", "c"]);
        let matcher = PairMatcher::default();
        let (mut collected, stats) = matcher.collect_bucket(&store, &b);
        let mut streamed = Vec::new();
        let streamed_stats =
            matcher.match_bucket(&store, &b, &mut PairSet::new(), |e| streamed.push(e));
        collected.sort();
        streamed.sort();
        assert_eq!(collected, streamed);
        assert_eq!(stats, streamed_stats);
    }
}
