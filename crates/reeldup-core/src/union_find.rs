//! Union-Find (disjoint set) structure whose representative is the least key.
//!
//! Elements are appended with [`UnionFind::push`] and addressed by the `usize`
//! ordinal it returns. Path compression uses iterative path-halving: during
//! [`UnionFind::find`] each visited node is pointed directly at its
//! grandparent. Union-by-size keeps trees shallow.
//!
//! The tree root is an internal detail. The externally visible representative
//! is [`UnionFind::least`]: the minimum key of the set, tracked on the root and
//! updated on every union, so it is independent of the order of operations.

/// A growable union-find over keys of type `K`.
#[derive(Debug, Clone)]
pub struct UnionFind<K> {
    keys: Vec<K>,
    parent: Vec<usize>,
    size: Vec<usize>,
    /// Ordinal of the least key in the set; meaningful on roots only.
    least: Vec<usize>,
}

impl<K: Ord> Default for UnionFind<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> UnionFind<K> {
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            parent: Vec::new(),
            size: Vec::new(),
            least: Vec::new(),
        }
    }

    /// Adds `key` as a singleton set and returns its ordinal.
    ///
    /// The caller is responsible for not adding the same key twice.
    pub fn push(&mut self, key: K) -> usize {
        let ordinal = self.keys.len();
        self.keys.push(key);
        self.parent.push(ordinal);
        self.size.push(1);
        self.least.push(ordinal);
        ordinal
    }

    /// Returns the root of the tree containing `x`.
    ///
    /// `x` must be an ordinal returned by [`UnionFind::push`].
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merges the sets containing `a` and `b`; returns the new root.
    ///
    /// The smaller tree is attached under the larger one. The least key of the
    /// merged set is the lesser of the two sets' least keys.
    pub fn union(&mut self, a: usize, b: usize) -> usize {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }

        let (root, child) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[child] = root;
        self.size[root] += self.size[child];

        let (lr, lc) = (self.least[root], self.least[child]);
        if self.keys[lc] < self.keys[lr] {
            self.least[root] = lc;
        }
        root
    }

    /// Returns the least key of the set containing `x`.
    pub fn least(&mut self, x: usize) -> &K {
        let root = self.find(x);
        &self.keys[self.least[root]]
    }

    /// Number of elements in the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if no element has been added.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Consumes the structure, yielding `(least key ordinal, member ordinals)`
    /// for every set, members ascending by ordinal.
    pub fn into_sets(mut self) -> (Vec<K>, Vec<(usize, Vec<usize>)>) {
        let n = self.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); n];
        for x in 0..n {
            let root = self.find(x);
            by_root[root].push(x);
        }
        let sets = by_root
            .into_iter()
            .enumerate()
            .filter(|(_, members)| !members.is_empty())
            .map(|(root, members)| (self.least[root], members))
            .collect();
        (self.keys, sets)
    }
}
