use anyhow::Context;
use kubellm_cluster_api::NodeSnapshot;
use kubellm_grading::grade_cluster;

use super::load_config;

pub fn classify(config: Option<&str>, nodes: &str, format: &str) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let snapshot = load_nodes(nodes)?;
    let result = grade_cluster(&config, &snapshot).context("grading pass failed")?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print!("{}", crate::report::format_grading(&result));
        }
    }

    Ok(())
}

fn load_nodes(path: &str) -> anyhow::Result<Vec<NodeSnapshot>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read node snapshot {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse node snapshot {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_node_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "a", "allocatable": {"cpu": "3", "memory": "20Gi"}},
                {"name": "b", "ready": false, "allocatable": {"cpu": 200}}
            ]"#,
        )
        .unwrap();

        let nodes = load_nodes(path.to_str().unwrap()).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[1].ready);
    }

    #[test]
    fn reports_unparsable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.json");
        std::fs::write(&path, r#"[{"name": "a", "allocatable": {"cpu": "four"}}]"#).unwrap();

        let err = load_nodes(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("failed to parse node snapshot"));
    }
}
