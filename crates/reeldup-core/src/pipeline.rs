//! End-to-end duplicate detection over a loaded catalog.
//!
//! Orchestrates, in order:
//!
//! 1. Year and genre index construction.
//! 2. Year-window and genre-bucket candidate generation, with optional
//!    runtime sub-bucketing.
//! 3. Pairwise matching of each bucket.
//! 4. Equivalence merging of the resulting edges.
//! 5. Oversized-cluster warnings.
//!
//! The primary entry point is [`find_duplicates`].
use serde::{Deserialize, Serialize};

use crate::candidates::{
    CandidateBucket, RuntimeWindow, buckets_for_window, split_by_runtime, year_windows,
};
use crate::index::CatalogIndex;
use crate::matcher::{BucketStats, DEFAULT_NAME_THRESHOLD, PairMatcher, PairSet};
use crate::merger::{Clusters, EquivalenceMerger};
use crate::newtypes::MovieId;
use crate::record::RecordStore;

/// Highest combined name score two records can reach.
pub const MAX_NAME_SCORE: u8 = 4;

// ---------------------------------------------------------------------------
// DedupConfig
// ---------------------------------------------------------------------------

/// Matching configuration.
///
/// The runtime tolerance is not part of this struct: it is applied when
/// records are loaded (see [`crate::parse::LoadConfig`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum `name_score(directors) + name_score(actors)`.
    ///
    /// Default: 3.
    pub name_threshold: u8,

    /// Split large buckets into overlapping runtime-sorted slices.
    ///
    /// Default: `None` (every bucket is scanned in full).
    pub runtime_window: Option<RuntimeWindow>,

    /// Clusters larger than this produce a [`DedupWarning::OversizedCluster`].
    ///
    /// Default: 50.
    pub group_size_limit: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            name_threshold: DEFAULT_NAME_THRESHOLD,
            runtime_window: None,
            group_size_limit: 50,
        }
    }
}

impl DedupConfig {
    /// Checks the configuration for values that cannot produce a sane run.
    ///
    /// # Errors
    ///
    /// See [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name_threshold > MAX_NAME_SCORE {
            return Err(ConfigError::UnreachableThreshold(self.name_threshold));
        }
        if let Some(window) = self.runtime_window {
            if !window.is_valid() {
                return Err(ConfigError::InvalidRuntimeWindow {
                    size: window.size,
                    stride: window.stride,
                });
            }
        }
        Ok(())
    }
}

/// Rejected [`DedupConfig`] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No pair can ever reach the threshold.
    #[error("name threshold {0} exceeds the maximum attainable score of {MAX_NAME_SCORE}")]
    UnreachableThreshold(u8),
    /// Slices must hold at least two ids and overlap or touch.
    #[error("runtime window needs size >= 2 and 1 <= stride <= size, got size={size}, stride={stride}")]
    InvalidRuntimeWindow {
        /// Configured slice size.
        size: usize,
        /// Configured stride.
        stride: usize,
    },
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Counters describing a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Records in the store.
    pub records: usize,
    /// Year windows visited.
    pub windows: usize,
    /// Buckets handed to the matcher.
    pub buckets: usize,
    /// Pairs scored.
    pub candidates: usize,
    /// Pairs that matched.
    pub matches: usize,
}

/// Non-fatal finding produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DedupWarning {
    /// A cluster exceeded the configured size limit.
    ///
    /// Usually a sign of a cascade where a weakly identified record links
    /// unrelated titles together.
    OversizedCluster {
        /// The cluster's representative.
        representative: MovieId,
        /// Records in the cluster.
        size: usize,
        /// The configured limit.
        limit: usize,
    },
}

impl std::fmt::Display for DedupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OversizedCluster {
                representative,
                size,
                limit,
            } => write!(
                f,
                "cluster {representative} has {size} records, exceeding the limit of {limit}"
            ),
        }
    }
}

/// The result of a run.
#[derive(Debug, Clone, Default)]
pub struct DedupOutput {
    /// Finalized duplicate clusters.
    pub clusters: Clusters,
    /// Work counters.
    pub stats: DedupStats,
    /// Non-fatal warnings.
    pub warnings: Vec<DedupWarning>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Finds duplicate clusters in `store`.
///
/// An empty store yields an empty output.
///
/// # Errors
///
/// Returns [`ConfigError`] when `config` fails [`DedupConfig::validate`].
pub fn find_duplicates(
    store: &RecordStore,
    config: &DedupConfig,
) -> Result<DedupOutput, ConfigError> {
    config.validate()?;

    let index = CatalogIndex::build(store);
    let matcher = match config.runtime_window {
        None => PairMatcher::new(config.name_threshold),
        Some(_) => PairMatcher::new(config.name_threshold).rescanning_previous_year(),
    };
    let mut merger = EquivalenceMerger::new();
    let mut stats = DedupStats {
        records: store.len(),
        ..DedupStats::default()
    };

    for window in year_windows(&index) {
        stats.windows += 1;
        let buckets = expand(buckets_for_window(&index, &window), store, config);
        stats.buckets += buckets.len();

        let window_stats = match_window(&matcher, store, &buckets, &mut merger);
        stats.candidates += window_stats.candidates;
        stats.matches += window_stats.matches;

        tracing::debug!(
            year = window.year,
            previous = ?window.previous,
            buckets = buckets.len(),
            candidates = window_stats.candidates,
            matches = window_stats.matches,
            "year window matched"
        );
    }

    let clusters = merger.finalize();
    let warnings = oversized(&clusters, config.group_size_limit);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        records = stats.records,
        candidates = stats.candidates,
        matches = stats.matches,
        clusters = clusters.len(),
        duplicates = clusters.duplicate_count(),
        "duplicate search complete"
    );

    Ok(DedupOutput {
        clusters,
        stats,
        warnings,
    })
}

/// Applies runtime sub-bucketing when configured.
fn expand(
    buckets: Vec<CandidateBucket>,
    store: &RecordStore,
    config: &DedupConfig,
) -> Vec<CandidateBucket> {
    match config.runtime_window {
        None => buckets,
        Some(window) => buckets
            .into_iter()
            .flat_map(|bucket| split_by_runtime(bucket, store, window))
            .collect(),
    }
}

#[cfg(not(feature = "parallel"))]
fn match_window(
    matcher: &PairMatcher,
    store: &RecordStore,
    buckets: &[CandidateBucket],
    merger: &mut EquivalenceMerger,
) -> BucketStats {
    let mut seen = PairSet::new();
    let mut stats = BucketStats::default();
    for bucket in buckets {
        stats += matcher.match_bucket(store, bucket, &mut seen, |edge| merger.add_edge(&edge));
    }
    stats
}

/// Scores buckets on the rayon pool; the merger is fed afterwards on the
/// calling thread, in bucket order. Pairs shared by several buckets are
/// scored once per bucket and de-duplicated before merging.
#[cfg(feature = "parallel")]
fn match_window(
    matcher: &PairMatcher,
    store: &RecordStore,
    buckets: &[CandidateBucket],
    merger: &mut EquivalenceMerger,
) -> BucketStats {
    use rayon::prelude::*;

    let results: Vec<_> = buckets
        .par_iter()
        .map(|bucket| matcher.collect_bucket(store, bucket))
        .collect();

    let mut seen = PairSet::new();
    let mut stats = BucketStats::default();
    for (edges, bucket_stats) in results {
        stats.candidates += bucket_stats.candidates;
        for edge in edges {
            if seen.insert(edge.low(), edge.high()) {
                stats.matches += 1;
                merger.add_edge(&edge);
            }
        }
    }
    stats
}

fn oversized(clusters: &Clusters, limit: usize) -> Vec<DedupWarning> {
    clusters
        .classes()
        .iter()
        .filter(|c| c.size() > limit)
        .map(|c| DedupWarning::OversizedCluster {
            representative: c.representative.clone(),
            size: c.size(),
            limit,
        })
        .collect()
}
