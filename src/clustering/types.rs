use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ResolutionError;

/// Graph clustering algorithms. Only connected components today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClusteringMethod {
    #[default]
    ConnectedComponents,
}

impl ClusteringMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ClusteringMethod::ConnectedComponents => "ConnectedComponents",
        }
    }
}

impl fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ClusteringMethod {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "connectedcomponents" | "basic" => Ok(ClusteringMethod::ConnectedComponents),
            _ => Err(ResolutionError::configuration(format!(
                "unknown clustering method '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for ClusteringMethod {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClusteringMethod> for String {
    fn from(method: ClusteringMethod) -> Self {
        method.name().to_string()
    }
}

/// One resolved entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Smallest member id.
    pub component_id: u64,
    /// Largest member id.
    pub representative_id: u64,
    /// Member ids, ascending.
    pub members: Vec<u64>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// A partition of the vertex set into clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    /// Ordered by ascending representative id.
    clusters: Vec<Cluster>,
    /// Vertex id -> component id.
    membership: BTreeMap<u64, u64>,
}

impl Clustering {
    /// Builds a clustering from disjoint, non-empty member groups.
    pub(crate) fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = Vec<u64>>,
    {
        let mut clusters = Vec::new();
        let mut membership = BTreeMap::new();

        for mut members in groups {
            if members.is_empty() {
                continue;
            }
            members.sort_unstable();
            let component_id = members[0];
            let representative_id = members[members.len() - 1];
            for &member in &members {
                membership.insert(member, component_id);
            }
            clusters.push(Cluster {
                component_id,
                representative_id,
                members,
            });
        }

        clusters.sort_by_key(|c| c.representative_id);
        Clustering {
            clusters,
            membership,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn membership(&self) -> &BTreeMap<u64, u64> {
        &self.membership
    }

    /// Component id -> representative id.
    pub fn representatives(&self) -> BTreeMap<u64, u64> {
        self.clusters
            .iter()
            .map(|c| (c.component_id, c.representative_id))
            .collect()
    }

    pub fn component_of(&self, vertex_id: u64) -> Option<u64> {
        self.membership.get(&vertex_id).copied()
    }

    pub fn representative_of(&self, vertex_id: u64) -> Option<u64> {
        let component_id = self.component_of(vertex_id)?;
        self.clusters
            .iter()
            .find(|c| c.component_id == component_id)
            .map(|c| c.representative_id)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.membership.len()
    }
}
