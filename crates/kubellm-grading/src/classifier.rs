//! Node classification.
//!
//! Each dimension of a node is located on its ladder independently. When
//! all dimensions land inside the same grade, that grade is the node's
//! grade. Otherwise the configured [`Reconcile`] strategy picks one of the
//! per-dimension grades.

use std::collections::BTreeMap;

use kubellm_cluster_api::{NodeSnapshot, ResourceList, ResourceName};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{GradingSettings, Reconcile, UnknownResourcePolicy};
use crate::error::{NodeError, NodeResult};
use crate::scheme::GradeScheme;

/// Grade assigned to a set of resource quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub grade: u32,
    /// Grade each dimension falls into on its own.
    pub dimensions: BTreeMap<ResourceName, u32>,
    /// Every dimension lies inside the ranges of `grade` itself.
    pub full_match: bool,
}

/// Grade assigned to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeGrade {
    pub node: String,
    #[serde(flatten)]
    pub classification: Classification,
}

impl NodeGrade {
    pub fn grade(&self) -> u32 {
        self.classification.grade
    }
}

/// Classify resource quantities against a scheme.
///
/// Dimensions graded by the scheme but absent from `quantities` count as
/// zero. Quantities for dimensions the scheme does not grade are rejected
/// or ignored according to `settings.unknown_resources`.
pub fn classify(
    quantities: &ResourceList,
    scheme: &GradeScheme,
    settings: &GradingSettings,
) -> NodeResult<Classification> {
    check_quantities(quantities, scheme, settings)?;

    let mut dimensions = BTreeMap::new();
    let mut lowest = usize::MAX;
    let mut highest = 0;
    let mut any_gap = false;

    for name in scheme.dimensions() {
        let quantity = quantities.get(name).copied().unwrap_or_default();
        let Some(hit) = scheme.locate(name, quantity) else {
            continue;
        };
        let grade = scheme.grade_at(hit.index);
        if hit.in_gap {
            any_gap = true;
            warn!(
                resource = name,
                %quantity,
                grade,
                "quantity falls between grades, using the grade below"
            );
        }
        dimensions.insert(name.to_string(), grade);
        lowest = lowest.min(hit.index);
        highest = highest.max(hit.index);
    }

    let full_match = lowest == highest && !any_gap;
    let index = if lowest == highest {
        lowest
    } else {
        match settings.reconcile {
            Reconcile::Highest => highest,
            Reconcile::Lowest => lowest,
        }
    };

    Ok(Classification {
        grade: scheme.grade_at(index),
        dimensions,
        full_match,
    })
}

/// Classify one node by its free resources (allocatable minus allocated).
pub fn classify_node(
    node: &NodeSnapshot,
    scheme: &GradeScheme,
    settings: &GradingSettings,
) -> NodeResult<NodeGrade> {
    check_quantities(&node.allocatable, scheme, settings)?;
    check_quantities(&node.allocated, scheme, settings)?;

    let free: ResourceList = scheme
        .dimensions()
        .map(|name| (name.to_string(), node.free(name)))
        .collect();
    let classification = classify(&free, scheme, settings)?;

    debug!(
        node = %node.name,
        grade = classification.grade,
        full_match = classification.full_match,
        "node graded"
    );

    Ok(NodeGrade {
        node: node.name.clone(),
        classification,
    })
}

fn check_quantities(
    quantities: &ResourceList,
    scheme: &GradeScheme,
    settings: &GradingSettings,
) -> NodeResult<()> {
    for (name, quantity) in quantities {
        if quantity.is_negative() {
            return Err(NodeError::NegativeQuantity {
                name: name.clone(),
                quantity: *quantity,
            });
        }
        if settings.unknown_resources == UnknownResourcePolicy::Reject && !scheme.covers(name) {
            return Err(NodeError::UnknownResource { name: name.clone() });
        }
    }
    Ok(())
}
