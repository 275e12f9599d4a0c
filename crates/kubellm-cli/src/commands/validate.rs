use tracing::info;

use super::load_config;

pub fn validate(config: &str) -> anyhow::Result<()> {
    let loaded = load_config(Some(config))?;
    let scheme = match loaded.scheme() {
        Ok(scheme) => scheme,
        Err(e) => {
            eprintln!("✗ {config}: {e}");
            return Err(e.into());
        }
    };

    let source = if loaded.resource_models.is_some() {
        "custom"
    } else {
        "default"
    };
    info!(path = config, grades = scheme.len(), source, "grading config valid");

    let dimensions: Vec<&str> = scheme.dimensions().collect();
    println!(
        "✓ {config}: {} {source} grades over {}",
        scheme.len(),
        dimensions.join(", ")
    );
    println!(
        "  reconcile={:?} gaps={:?} unknown_resources={:?}",
        loaded.grading.reconcile, loaded.grading.gaps, loaded.grading.unknown_resources
    );
    print!("{}", crate::report::format_ladder(&scheme));
    Ok(())
}
