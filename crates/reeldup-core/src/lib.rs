#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod candidates;
pub mod index;
pub mod matcher;
pub mod merger;
pub mod newtypes;
pub mod parse;
pub mod pipeline;
pub mod record;
pub mod union_find;

#[cfg(test)]
mod test_helpers;

pub use candidates::{
    CandidateBucket, RuntimeWindow, YearWindow, buckets_for_window, split_by_runtime,
    year_windows,
};
pub use index::CatalogIndex;
pub use matcher::{
    BucketStats, DEFAULT_NAME_THRESHOLD, MatchEdge, PairMatcher, PairSet, combined_name_score,
    name_score, runtime_compatible,
};
pub use merger::{Clusters, EquivalenceClass, EquivalenceMerger};
pub use newtypes::{GenreCode, MovieId, NewtypeError, UNKNOWN_TOKEN};
pub use parse::{FIELD_COUNT, LoadConfig, LoadError, parse_catalog, parse_line};
pub use pipeline::{
    ConfigError, DedupConfig, DedupOutput, DedupStats, DedupWarning, MAX_NAME_SCORE,
    find_duplicates,
};
pub use record::{MovieRecord, RecordError, RecordStore, ToleranceBand};
pub use union_find::UnionFind;

/// Returns the current version of the reeldup-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
