use crate::error::{ResolutionError, Result};
use crate::matching::Match;

/// Dense positions for a sparse set of vertex ids.
///
/// Positions follow ascending id order, so the smallest position in a
/// component is also its smallest id.
pub(crate) struct VertexIndex {
    ids: Vec<u64>,
}

impl VertexIndex {
    pub fn new(vertex_ids: &[u64]) -> Self {
        let mut ids = vertex_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        VertexIndex { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// Maps every match to a (position, position) edge.
    pub fn edges(&self, matches: &[Match]) -> Result<Vec<(usize, usize)>> {
        matches
            .iter()
            .enumerate()
            .map(|(row, m)| -> Result<(usize, usize)> {
                let endpoint = |id: u64| {
                    self.position(id).ok_or_else(|| {
                        ResolutionError::data_shape(
                            "matches",
                            row + 1,
                            format!("match endpoint {} is not a known vertex", id),
                        )
                    })
                };
                Ok((endpoint(m.left_id())?, endpoint(m.right_id())?))
            })
            .collect()
    }

    /// Groups positions by a root/label per position into id lists.
    pub fn group_by_label(&self, labels: &[usize]) -> Vec<Vec<u64>> {
        let mut groups: Vec<Vec<u64>> = vec![Vec::new(); self.ids.len()];
        for (position, &label) in labels.iter().enumerate() {
            groups[label].push(self.ids[position]);
        }
        groups.retain(|group| !group.is_empty());
        groups
    }
}
