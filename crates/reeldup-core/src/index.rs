//! Year and genre lookup tables over a [`RecordStore`].
//!
//! Built once after loading and read-only afterwards. Every record id appears
//! under its release year and under each of its genre codes; records without
//! a genre are filed under [`GenreCode::Unknown`].
use std::collections::{BTreeMap, BTreeSet};

use crate::newtypes::{GenreCode, MovieId};
use crate::record::RecordStore;

/// Secondary indices used by the candidate generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    years: BTreeMap<i32, BTreeSet<MovieId>>,
    genres: BTreeMap<GenreCode, BTreeSet<MovieId>>,
}

impl CatalogIndex {
    /// Indexes every record of `store`.
    pub fn build(store: &RecordStore) -> Self {
        let mut years: BTreeMap<i32, BTreeSet<MovieId>> = BTreeMap::new();
        let mut genres: BTreeMap<GenreCode, BTreeSet<MovieId>> = BTreeMap::new();
        for record in store.iter() {
            years
                .entry(record.year())
                .or_default()
                .insert(record.id().clone());
            for genre in record.genres() {
                genres
                    .entry(genre.clone())
                    .or_default()
                    .insert(record.id().clone());
            }
        }
        Self { years, genres }
    }

    /// Year → ids, ascending by year.
    pub fn years(&self) -> &BTreeMap<i32, BTreeSet<MovieId>> {
        &self.years
    }

    /// Genre → ids, with [`GenreCode::Unknown`] first when present.
    pub fn genres(&self) -> &BTreeMap<GenreCode, BTreeSet<MovieId>> {
        &self.genres
    }

    /// Ids released in `year`; `None` if the year never occurs.
    pub fn ids_for_year(&self, year: i32) -> Option<&BTreeSet<MovieId>> {
        self.years.get(&year)
    }

    /// Ids filed under `genre`.
    pub fn ids_for_genre(&self, genre: &GenreCode) -> Option<&BTreeSet<MovieId>> {
        self.genres.get(genre)
    }

    /// Ids with no usable genre.
    pub fn unknown_genre_ids(&self) -> Option<&BTreeSet<MovieId>> {
        self.genres.get(&GenreCode::Unknown)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::test_helpers::{movie, movie_id, store};

    #[test]
    fn empty_store_builds_empty_index() {
        let index = CatalogIndex::build(&RecordStore::new());
        assert!(index.years().is_empty());
        assert!(index.genres().is_empty());
        assert!(index.unknown_genre_ids().is_none());
    }

    #[test]
    fn every_id_is_filed_under_year_and_each_genre() {
        let store = store(vec![
            movie("tt1", 2000, 90, &["Drama", "Crime"], &[], &[]),
            movie("tt2", 2000, 95, &["Drama"], &[], &[]),
            movie("tt3", 2001, 100, &[], &[], &[]),
        ]);
        let index = CatalogIndex::build(&store);

        let y2000 = index.ids_for_year(2000).expect("2000 indexed");
        assert_eq!(y2000.len(), 2);
        assert!(y2000.contains(&movie_id("tt1")));
        assert!(index.ids_for_year(2001).expect("2001").contains(&movie_id("tt3")));
        assert!(index.ids_for_year(1999).is_none());

        let drama = index
            .ids_for_genre(&GenreCode::Known("Drama".to_owned()))
            .expect("drama");
        assert_eq!(drama.len(), 2);
        let crime = index
            .ids_for_genre(&GenreCode::Known("Crime".to_owned()))
            .expect("crime");
        assert_eq!(crime.iter().collect::<Vec<_>>(), vec![&movie_id("tt1")]);
        let unknown = index.unknown_genre_ids().expect("unknown bucket");
        assert_eq!(unknown.iter().collect::<Vec<_>>(), vec![&movie_id("tt3")]);
    }

    #[test]
    fn no_record_is_dropped() {
        let store = store(vec![
            movie("a", 1990, 90, &["X"], &[], &[]),
            movie("b", 1995, 90, &[], &[], &[]),
            movie("c", 2020, 90, &["Y", "Z"], &[], &[]),
        ]);
        let index = CatalogIndex::build(&store);
        let by_year: usize = index.years().values().map(BTreeSet::len).sum();
        assert_eq!(by_year, store.len());
        for record in store.iter() {
            for genre in record.genres() {
                assert!(
                    index
                        .ids_for_genre(genre)
                        .is_some_and(|ids| ids.contains(record.id())),
                    "{} missing from genre {genre}",
                    record.id()
                );
            }
        }
    }
}
