//! Kubellm resource grading: classify member-cluster nodes into
//! resource-model grades.
//!
//! Given a cluster's resource-model ladder (or the default one) and a
//! snapshot of its nodes, the engine assigns every node exactly one grade
//! and folds the result into per-grade node counts for cluster status.
//! Every function here is pure: the ladder is passed in explicitly and
//! nothing is cached between passes.
//!
//! # Components
//!
//! - **`defaults`**: The canonical 0–8 ladder used when a cluster declares none
//! - **`scheme`**: Ladder validation and per-dimension interval lookup
//! - **`classifier`**: Per-node grading across all dimensions
//! - **`aggregator`**: Grade histogram (`AllocatableModeling`) folding
//! - **`summary`**: One full grading pass over a cluster snapshot
//! - **`config`**: `grading.toml` settings and policies

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod defaults;
pub mod error;
pub mod scheme;
pub mod summary;

pub use aggregator::{aggregate, merge_modelings};
pub use classifier::{Classification, NodeGrade, classify, classify_node};
pub use config::{GapPolicy, GradingConfig, GradingSettings, Reconcile, UnknownResourcePolicy};
pub use defaults::{DEFAULT_GRADE_COUNT, default_resource_models};
pub use error::{GradingError, GradingResult, NodeError, NodeResult};
pub use scheme::{DimensionMatch, GradeScheme};
pub use summary::{ClusterGrading, SkippedNode, grade_cluster, summarize};
