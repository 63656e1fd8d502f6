//! Equivalence merging of match edges into duplicate clusters.
//!
//! [`EquivalenceMerger`] accepts match edges in any order, any number of
//! times, and maintains connected components of the match graph. Calling
//! [`EquivalenceMerger::finalize`] consumes the merger and yields
//! [`Clusters`]; after that no edge can be submitted.
//!
//! Each cluster is reported as its least id (the representative) plus the
//! set of other member ids. Ids that never appeared on an edge produce no
//! cluster.
use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::matcher::MatchEdge;
use crate::newtypes::MovieId;
use crate::union_find::UnionFind;

// ---------------------------------------------------------------------------
// EquivalenceMerger
// ---------------------------------------------------------------------------

/// Accumulates match edges into disjoint components.
#[derive(Debug, Default)]
pub struct EquivalenceMerger {
    ordinals: HashMap<MovieId, usize>,
    sets: UnionFind<MovieId>,
    edges_seen: usize,
}

impl EquivalenceMerger {
    /// Creates a merger with no components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions the two ends of `edge`.
    ///
    /// Re-submitting an edge, or an edge implied by transitivity, leaves the
    /// components unchanged. Self-loops are ignored.
    pub fn add_edge(&mut self, edge: &MatchEdge) {
        self.edges_seen += 1;
        if edge.is_loop() {
            return;
        }
        let a = self.ordinal(edge.low());
        let b = self.ordinal(edge.high());
        self.sets.union(a, b);
    }

    /// Current representative of `id`, or `None` if `id` is on no edge.
    pub fn representative(&mut self, id: &MovieId) -> Option<&MovieId> {
        let ordinal = *self.ordinals.get(id)?;
        Some(self.sets.least(ordinal))
    }

    /// Number of edges submitted so far, repeats included.
    pub fn edge_count(&self) -> usize {
        self.edges_seen
    }

    /// Number of distinct ids seen on edges.
    pub fn id_count(&self) -> usize {
        self.ordinals.len()
    }

    /// Closes the merger and builds the final clusters.
    pub fn finalize(self) -> Clusters {
        let (keys, sets) = self.sets.into_sets();
        let mut classes: Vec<EquivalenceClass> = sets
            .into_iter()
            .filter_map(|(least, members)| {
                let representative = keys[least].clone();
                let duplicates: BTreeSet<MovieId> = members
                    .into_iter()
                    .filter(|&m| m != least)
                    .map(|m| keys[m].clone())
                    .collect();
                (!duplicates.is_empty()).then_some(EquivalenceClass {
                    representative,
                    duplicates,
                })
            })
            .collect();
        classes.sort_by(|a, b| a.representative.cmp(&b.representative));
        Clusters { classes }
    }

    fn ordinal(&mut self, id: &MovieId) -> usize {
        if let Some(&ordinal) = self.ordinals.get(id) {
            return ordinal;
        }
        let ordinal = self.sets.push(id.clone());
        self.ordinals.insert(id.clone(), ordinal);
        ordinal
    }
}

impl Extend<MatchEdge> for EquivalenceMerger {
    fn extend<I: IntoIterator<Item = MatchEdge>>(&mut self, iter: I) {
        for edge in iter {
            self.add_edge(&edge);
        }
    }
}

// ---------------------------------------------------------------------------
// EquivalenceClass / Clusters
// ---------------------------------------------------------------------------

/// One group of records describing the same movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceClass {
    /// Least id of the group.
    pub representative: MovieId,
    /// Every other id of the group; never empty, never holds the representative.
    pub duplicates: BTreeSet<MovieId>,
}

impl EquivalenceClass {
    /// Number of records in the class, representative included.
    pub fn size(&self) -> usize {
        self.duplicates.len() + 1
    }

    /// Returns `true` when `id` is the representative or a duplicate.
    pub fn contains(&self, id: &MovieId) -> bool {
        self.representative == *id || self.duplicates.contains(id)
    }
}

/// Finalized clusters, ordered by representative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Clusters {
    classes: Vec<EquivalenceClass>,
}

impl Clusters {
    /// Classes ascending by representative.
    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` when no duplicates were found.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of duplicate ids across classes.
    pub fn duplicate_count(&self) -> usize {
        self.classes.iter().map(|c| c.duplicates.len()).sum()
    }

    /// The class holding `id`, if any.
    pub fn class_of(&self, id: &MovieId) -> Option<&EquivalenceClass> {
        self.classes.iter().find(|c| c.contains(id))
    }

    /// `(representative, duplicate)` pairs in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (&MovieId, &MovieId)> {
        self.classes
            .iter()
            .flat_map(|c| c.duplicates.iter().map(move |d| (&c.representative, d)))
    }
}

impl IntoIterator for Clusters {
    type Item = EquivalenceClass;
    type IntoIter = std::vec::IntoIter<EquivalenceClass>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.into_iter()
    }
}
