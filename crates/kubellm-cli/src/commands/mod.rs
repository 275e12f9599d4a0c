pub mod classify;
pub mod defaults;
pub mod init;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use kubellm_grading::GradingConfig;

/// Load a grading config, or the built-in defaults when no path is given.
pub fn load_config(path: Option<&str>) -> anyhow::Result<GradingConfig> {
    match path {
        Some(path) => GradingConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to load grading config {path}")),
        None => Ok(GradingConfig::default()),
    }
}
