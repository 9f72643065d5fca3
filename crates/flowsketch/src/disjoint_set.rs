//! Disjoint-set forest over dense indices.

/// Union-find with union by rank and path compression.
///
/// `find` walks the parent chain iteratively, so deep chains built from
/// adversarial input cannot exhaust the stack.
#[derive(Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Creates `len` singleton sets.
    pub(crate) fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Returns the representative of the set containing `x`.
    pub(crate) fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets containing `x` and `y`.
    pub(crate) fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }

        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] = self.rank[root_x].saturating_add(1);
            }
        }
    }

    /// Groups all indices by set, each group ascending, groups ordered by
    /// their smallest member.
    pub(crate) fn groups(&mut self) -> Vec<Vec<usize>> {
        let len = self.parent.len();
        let mut slot_of_root = vec![usize::MAX; len];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for idx in 0..len {
            let root = self.find(idx);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot_of_root[root]].push(idx);
        }
        groups
    }
}
