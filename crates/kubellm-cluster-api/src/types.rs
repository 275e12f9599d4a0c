//! Resource-model and status types of the member-cluster API.
//!
//! `ResourceModel` belongs to the cluster's desired state and is supplied by users.
//! `AllocatableModeling`, `NodeSummary` and `ResourceSummary` belong to the
//! cluster status and are recomputed wholesale on every grading pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quantity::Quantity;

/// Name of a resource dimension ("cpu", "memory", ...).
///
/// Dimensions are open-ended; the constants below are the names the cluster
/// API documents for resource modeling.
pub type ResourceName = String;

pub const RESOURCE_CPU: &str = "cpu";
pub const RESOURCE_MEMORY: &str = "memory";
pub const RESOURCE_STORAGE: &str = "storage";
pub const RESOURCE_EPHEMERAL_STORAGE: &str = "ephemeral-storage";

/// Resource amounts keyed by dimension. Ordered for reproducible output.
pub type ResourceList = BTreeMap<ResourceName, Quantity>;

// ── Models ────────────────────────────────────────────────────────

/// One rung of a cluster's resource-model ladder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceModel {
    /// Index of this rung. Unique within a ladder.
    pub grade: u32,
    /// One `[min, max)` range per resource dimension.
    pub ranges: Vec<ResourceModelRange>,
}

/// The `[min, max)` interval of one dimension within one grade.
///
/// The `min` of the lowest grade always acts as zero, and the `max` of the
/// highest grade is never compared against: everything at or above its
/// `min` belongs to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceModelRange {
    pub name: ResourceName,
    pub min: Quantity,
    pub max: Quantity,
}

impl ResourceModel {
    pub fn new(grade: u32, ranges: Vec<ResourceModelRange>) -> Self {
        Self { grade, ranges }
    }

    /// Look up the range for a dimension.
    pub fn range(&self, name: &str) -> Option<&ResourceModelRange> {
        self.ranges.iter().find(|r| r.name == name)
    }
}

impl ResourceModelRange {
    pub fn new(name: impl Into<ResourceName>, min: Quantity, max: Quantity) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Half-open membership test: `min <= quantity < max`.
    pub fn contains(&self, quantity: Quantity) -> bool {
        self.min <= quantity && quantity < self.max
    }
}

// ── Inventory ─────────────────────────────────────────────────────

/// Point-in-time resource view of one node, as collected from the member
/// cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub name: String,
    #[serde(default = "default_ready")]
    pub ready: bool,
    /// Resources available for scheduling on the node.
    #[serde(default)]
    pub allocatable: ResourceList,
    /// Resources already requested by pods bound to the node.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub allocated: ResourceList,
}

fn default_ready() -> bool {
    true
}

impl NodeSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ready: true,
            allocatable: ResourceList::new(),
            allocated: ResourceList::new(),
        }
    }

    pub fn with_allocatable(mut self, name: impl Into<ResourceName>, quantity: Quantity) -> Self {
        self.allocatable.insert(name.into(), quantity);
        self
    }

    pub fn with_allocated(mut self, name: impl Into<ResourceName>, quantity: Quantity) -> Self {
        self.allocated.insert(name.into(), quantity);
        self
    }

    /// Unrequested amount of a dimension. Missing entries count as zero and
    /// the result never goes below zero.
    pub fn free(&self, name: &str) -> Quantity {
        let allocatable = self.allocatable.get(name).copied().unwrap_or_default();
        let allocated = self.allocated.get(name).copied().unwrap_or_default();
        allocatable.saturating_sub(allocated).max(Quantity::ZERO)
    }
}

// ── Status ────────────────────────────────────────────────────────

/// Number of nodes whose free resources fall into one grade.
///
/// `AllocatableModeling { grade: 2, count: 10 }` means ten nodes belong to
/// the grade-2 resource model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct AllocatableModeling {
    pub grade: u32,
    pub count: u64,
}

/// Node counts of a member cluster.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub total_num: u32,
    pub ready_num: u32,
}

/// Resource totals of a member cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    /// Sum of allocatable resources over all nodes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub allocatable: ResourceList,
    /// Sum of resources requested by pods already bound to nodes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub allocated: ResourceList,
    /// Per-grade node counts, ascending by grade.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allocatable_modelings: Vec<AllocatableModeling>,
}
