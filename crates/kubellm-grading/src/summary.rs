//! Cluster grading pass.
//!
//! One pass takes a snapshot of a cluster's nodes and produces everything
//! the status writer needs: node counts, resource totals, and the grade
//! histogram. Nodes with bad input are skipped and reported; they never
//! abort the pass.

use kubellm_cluster_api::{NodeSnapshot, NodeSummary, ResourceList, ResourceSummary};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::aggregate;
use crate::classifier::{NodeGrade, classify_node};
use crate::config::{GradingConfig, GradingSettings};
use crate::error::{GradingResult, NodeError};
use crate::scheme::GradeScheme;

/// A node left out of the histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedNode {
    pub node: String,
    #[serde(flatten)]
    pub error: NodeError,
}

/// Result of grading one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterGrading {
    pub node_summary: NodeSummary,
    pub resource_summary: ResourceSummary,
    /// Per-node grades, in input order.
    pub nodes: Vec<NodeGrade>,
    pub skipped: Vec<SkippedNode>,
}

impl ClusterGrading {
    pub fn graded_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Grade a cluster with the ladder and policies from its config.
///
/// A malformed ladder fails the whole pass and produces no modelings.
pub fn grade_cluster(config: &GradingConfig, nodes: &[NodeSnapshot]) -> GradingResult<ClusterGrading> {
    let scheme = config.scheme()?;
    Ok(summarize(nodes, &scheme, &config.grading))
}

/// Grade every node against an already validated scheme.
pub fn summarize(
    nodes: &[NodeSnapshot],
    scheme: &GradeScheme,
    settings: &GradingSettings,
) -> ClusterGrading {
    let mut graded = Vec::with_capacity(nodes.len());
    let mut skipped = Vec::new();

    for node in nodes {
        match classify_node(node, scheme, settings) {
            Ok(grade) => graded.push(grade),
            Err(error) => {
                warn!(node = %node.name, %error, "node skipped");
                skipped.push(SkippedNode {
                    node: node.name.clone(),
                    error,
                });
            }
        }
    }

    let node_summary = NodeSummary {
        total_num: saturating_u32(nodes.len()),
        ready_num: saturating_u32(nodes.iter().filter(|n| n.ready).count()),
    };
    let resource_summary = ResourceSummary {
        allocatable: totals(nodes.iter().map(|n| &n.allocatable)),
        allocated: totals(nodes.iter().map(|n| &n.allocated)),
        allocatable_modelings: aggregate(&graded),
    };

    info!(
        nodes = nodes.len(),
        graded = graded.len(),
        skipped = skipped.len(),
        grades = scheme.len(),
        "grading pass complete"
    );

    ClusterGrading {
        node_summary,
        resource_summary,
        nodes: graded,
        skipped,
    }
}

/// Sum resource lists per dimension. Negative entries are invalid input
/// and left out; a total that overflows is pinned at the maximum.
fn totals<'a>(lists: impl Iterator<Item = &'a ResourceList>) -> ResourceList {
    let mut totals = ResourceList::new();
    for list in lists {
        for (name, quantity) in list {
            if quantity.is_negative() {
                continue;
            }
            let total = totals.entry(name.clone()).or_default();
            *total = match total.checked_add(*quantity) {
                Some(sum) => sum,
                None => {
                    warn!(resource = %name, "resource total overflowed, saturating");
                    total.saturating_add(*quantity)
                }
            };
        }
    }
    totals
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
