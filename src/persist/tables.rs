use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::clustering::Clustering;
use crate::error::Result;
use crate::evaluation::{format_metric, MethodResult};
use crate::harness::ScalabilityRow;
use crate::TARGET_PERSIST;

#[derive(Serialize)]
struct ClusterRow {
    component_id: u64,
    representative_id: u64,
    size: usize,
}

#[derive(Serialize)]
struct MembershipRow {
    vertex_id: u64,
    component_id: u64,
}

#[derive(Serialize)]
struct MethodRow<'a> {
    threshold: f64,
    matching_method: &'a str,
    blocking_method: &'a str,
    candidates: usize,
    matches: usize,
    true_positive: usize,
    false_negative: usize,
    false_positive: usize,
    precision: String,
    recall: String,
    f1: String,
    duration_ms: f64,
}

/// Cluster table, one row per component in ascending representative order.
pub fn write_clusters<W: Write>(writer: W, clustering: &Clustering) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for cluster in clustering.clusters() {
        csv.serialize(ClusterRow {
            component_id: cluster.component_id,
            representative_id: cluster.representative_id,
            size: cluster.size(),
        })?;
    }
    csv.flush()?;
    info!(target: TARGET_PERSIST, "Wrote {} clusters", clustering.len());
    Ok(())
}

/// Vertex id -> component id, ascending vertex id.
pub fn write_membership<W: Write>(writer: W, clustering: &Clustering) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (&vertex_id, &component_id) in clustering.membership() {
        csv.serialize(MembershipRow {
            vertex_id,
            component_id,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Method-sweep table. Undefined metrics are written as `undefined`.
pub fn write_method_results<W: Write>(writer: W, results: &[MethodResult]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for result in results {
        csv.serialize(MethodRow {
            threshold: result.threshold,
            matching_method: result.matching_method.name(),
            blocking_method: result.blocking_method.name(),
            candidates: result.candidates,
            matches: result.matches,
            true_positive: result.counts.true_positive,
            false_negative: result.counts.false_negative,
            false_positive: result.counts.false_positive,
            precision: format_metric(result.counts.precision()),
            recall: format_metric(result.counts.recall()),
            f1: format_metric(result.counts.f1()),
            duration_ms: result.duration.as_secs_f64() * 1000.0,
        })?;
    }
    csv.flush()?;
    info!(target: TARGET_PERSIST, "Wrote {} method results", results.len());
    Ok(())
}

/// Scalability table for the reporting collaborator.
pub fn write_scalability_results<W: Write>(writer: W, rows: &[ScalabilityRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    info!(target: TARGET_PERSIST, "Wrote {} scalability rows", rows.len());
    Ok(())
}
