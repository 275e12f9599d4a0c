//! grading.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use kubellm_cluster_api::ResourceModel;

use crate::defaults::default_resource_models;
use crate::error::GradingResult;
use crate::scheme::GradeScheme;

/// A cluster's grading configuration: policies plus an optional ladder.
///
/// Leaving out `resource_models` selects the default ladder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub grading: GradingSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<ResourceModel>>,
}

/// Engine policies for the ambiguous corners of classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingSettings {
    pub reconcile: Reconcile,
    pub gaps: GapPolicy,
    pub unknown_resources: UnknownResourcePolicy,
}

/// How to pick a node grade when its dimensions land on different grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reconcile {
    /// Take the highest per-dimension grade.
    #[default]
    Highest,
    /// Take the lowest per-dimension grade: the node satisfies every
    /// minimum of the grade it is counted in.
    Lowest,
}

/// Whether a ladder may leave gaps between consecutive grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    /// Accept gaps; a value inside one takes the grade below it.
    #[default]
    NearestLower,
    /// Reject ladders with gaps.
    Reject,
}

/// What to do with node resources the ladder does not grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownResourcePolicy {
    /// Skip the node and report it.
    #[default]
    Reject,
    /// Grade the node on the dimensions the ladder knows.
    Ignore,
}

impl GradingConfig {
    pub fn from_file(path: &Path) -> GradingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> GradingResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> GradingResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the validated ladder this config describes.
    pub fn scheme(&self) -> GradingResult<GradeScheme> {
        GradeScheme::resolve(self.resource_models.as_deref(), self.grading.gaps)
    }

    /// Scaffold a grading.toml spelling out the default ladder, ready to
    /// be edited.
    pub fn scaffold() -> Self {
        GradingConfig {
            grading: GradingSettings::default(),
            resource_models: Some(default_resource_models()),
        }
    }
}
