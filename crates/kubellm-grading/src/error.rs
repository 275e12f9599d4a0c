//! Grading error types.
//!
//! [`GradingError`] covers malformed ladders and settings: the whole pass is
//! rejected and no modelings are produced. [`NodeError`] covers bad input
//! for a single node: that node is skipped and the pass carries on.

use kubellm_cluster_api::{Quantity, ResourceName};
use serde::Serialize;
use thiserror::Error;

/// Errors that reject a grading configuration.
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("resource model list is empty")]
    EmptyScheme,

    #[error("grade {0} is declared more than once")]
    DuplicateGrade(u32),

    #[error("grade {grade} declares no ranges")]
    EmptyRanges { grade: u32 },

    #[error("grade {grade} declares resource {name:?} more than once")]
    DuplicateRange { grade: u32, name: ResourceName },

    #[error("grade {grade} has no range for resource {name:?}")]
    MissingRange { grade: u32, name: ResourceName },

    #[error("grade {grade} resource {name:?}: max {max} must be greater than min {min}")]
    InvalidRange {
        grade: u32,
        name: ResourceName,
        min: Quantity,
        max: Quantity,
    },

    #[error("grade {grade} resource {name:?}: min {min} is negative")]
    NegativeBound {
        grade: u32,
        name: ResourceName,
        min: Quantity,
    },

    #[error("resource {name:?}: grade {upper} starts at {min}, inside grade {lower} which ends at {max}")]
    Overlap {
        name: ResourceName,
        lower: u32,
        upper: u32,
        min: Quantity,
        max: Quantity,
    },

    #[error("resource {name:?}: gap between grade {lower} (ends at {max}) and grade {upper} (starts at {min})")]
    Gap {
        name: ResourceName,
        lower: u32,
        upper: u32,
        min: Quantity,
        max: Quantity,
    },

    #[error("failed to read grading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse grading config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize grading config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type GradingResult<T> = Result<T, GradingError>;

/// Errors that skip a single node during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NodeError {
    #[error("resource {name:?} is not covered by the resource models")]
    UnknownResource { name: ResourceName },

    #[error("resource {name:?} has negative quantity {quantity}")]
    NegativeQuantity { name: ResourceName, quantity: Quantity },
}

pub type NodeResult<T> = Result<T, NodeError>;
