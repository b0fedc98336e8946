// Module declarations
pub mod label_propagation;
pub mod types;
pub mod union_find;
mod util;

pub use types::*;

pub use label_propagation::connected_components_partitioned;
pub use union_find::{connected_components, UnionFind};

use crate::error::Result;
use crate::matching::Match;

/// Groups vertices into connected components of the match graph.
///
/// Every id in `vertex_ids` ends up in exactly one cluster; vertices without
/// matches are singletons. Both match endpoints must be in `vertex_ids`.
pub fn cluster(
    matches: &[Match],
    vertex_ids: &[u64],
    method: ClusteringMethod,
) -> Result<Clustering> {
    match method {
        ClusteringMethod::ConnectedComponents => connected_components(matches, vertex_ids),
    }
}
