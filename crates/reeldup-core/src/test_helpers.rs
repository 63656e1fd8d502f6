//! Shared test helper functions for constructing fixtures.
//!
//! This module is compiled only in test builds. Integration tests in
//! `crates/reeldup-core/tests/` define their own local helpers because they
//! link against the non-test library build where this module is not available.
#![allow(clippy::expect_used)]

use std::collections::BTreeSet;

use crate::matcher::MatchEdge;
use crate::newtypes::{GenreCode, MovieId};
use crate::record::{MovieRecord, RecordStore, ToleranceBand};

/// Creates a [`MovieId`], panicking on invalid input.
pub fn movie_id(s: &str) -> MovieId {
    MovieId::try_from(s).expect("valid MovieId")
}

/// Builds a name-token set.
pub fn names(tokens: &[&str]) -> BTreeSet<String> {
    tokens.iter().map(|t| (*t).to_owned()).collect()
}

/// Builds a record with the default linear tolerance band.
pub fn movie(
    id: &str,
    year: i32,
    length: i64,
    genres: &[&str],
    directors: &[&str],
    actors: &[&str],
) -> MovieRecord {
    let genres: BTreeSet<GenreCode> = genres
        .iter()
        .map(|g| GenreCode::try_from(*g).expect("valid GenreCode"))
        .collect();
    MovieRecord::new(
        movie_id(id),
        year,
        length,
        genres,
        names(directors),
        names(actors),
        ToleranceBand::LINEAR,
    )
    .expect("valid MovieRecord")
}

/// Collects records into a store, panicking on duplicate ids.
pub fn store(records: Vec<MovieRecord>) -> RecordStore {
    let mut store = RecordStore::new();
    for record in records {
        store.insert(record).expect("unique id");
    }
    store
}

/// Builds a match edge between two ids.
pub fn edge(a: &str, b: &str) -> MatchEdge {
    MatchEdge::new(movie_id(a), movie_id(b))
}
