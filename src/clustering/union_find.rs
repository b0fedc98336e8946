use tracing::info;

use super::types::Clustering;
use super::util::VertexIndex;
use crate::error::Result;
use crate::matching::Match;
use crate::TARGET_CLUSTERING;

/// Array-backed disjoint sets with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    components: usize,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
            components: size,
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Returns `true` when `a` and `b` were in different sets.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }

        self.components -= 1;
        true
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Single-process connected components over the match graph.
pub fn connected_components(matches: &[Match], vertex_ids: &[u64]) -> Result<Clustering> {
    let index = VertexIndex::new(vertex_ids);
    let edges = index.edges(matches)?;

    let mut sets = UnionFind::new(index.len());
    let mut merging_edges = 0usize;
    for &(u, v) in &edges {
        if sets.union(u, v) {
            merging_edges += 1;
        }
    }

    let roots: Vec<usize> = (0..index.len()).map(|p| sets.find(p)).collect();
    let clustering = Clustering::from_groups(index.group_by_label(&roots));

    info!(
        target: TARGET_CLUSTERING,
        "Union-find: {} vertices, {} edges ({} merging) -> {} clusters",
        index.len(),
        edges.len(),
        merging_edges,
        clustering.len()
    );

    Ok(clustering)
}
