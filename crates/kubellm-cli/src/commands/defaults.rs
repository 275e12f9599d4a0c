use kubellm_grading::{GradeScheme, GradingConfig, default_resource_models};

pub fn defaults(format: &str) -> anyhow::Result<()> {
    match format {
        "toml" => {
            print!("{}", GradingConfig::scaffold().to_toml_string()?);
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&default_resource_models())?);
        }
        _ => {
            print!("{}", crate::report::format_ladder(&GradeScheme::default_ladder()));
        }
    }
    Ok(())
}
