//! Plain-text rendering of ladders and grading results.

use kubellm_cluster_api::ResourceList;
use kubellm_grading::{ClusterGrading, GradeScheme};

pub fn format_ladder(scheme: &GradeScheme) -> String {
    let dimensions: Vec<&str> = scheme.dimensions().collect();
    let terminal = scheme.terminal_grade();

    let rows: Vec<Vec<String>> = scheme
        .models()
        .iter()
        .map(|model| {
            let mut row = vec![model.grade.to_string()];
            for name in &dimensions {
                let cell = match model.range(name) {
                    Some(range) if model.grade == terminal => format!("[{}, ∞)", range.min),
                    Some(range) => format!("[{}, {})", range.min, range.max),
                    None => "-".to_string(),
                };
                row.push(cell);
            }
            row
        })
        .collect();

    let mut header = vec!["GRADE".to_string()];
    header.extend(dimensions.iter().map(|d| d.to_uppercase()));
    render_table(&header, &rows)
}

pub fn format_grading(result: &ClusterGrading) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Nodes: {} total, {} ready, {} graded, {} skipped\n\n",
        result.node_summary.total_num,
        result.node_summary.ready_num,
        result.graded_count(),
        result.skipped_count(),
    ));

    let modelings: Vec<Vec<String>> = result
        .resource_summary
        .allocatable_modelings
        .iter()
        .map(|m| vec![m.grade.to_string(), m.count.to_string()])
        .collect();
    out.push_str(&render_table(
        &["GRADE".to_string(), "NODES".to_string()],
        &modelings,
    ));
    out.push('\n');

    out.push_str(&format!(
        "Allocatable: {}\n",
        format_resources(&result.resource_summary.allocatable)
    ));
    if !result.resource_summary.allocated.is_empty() {
        out.push_str(&format!(
            "Allocated:   {}\n",
            format_resources(&result.resource_summary.allocated)
        ));
    }

    if !result.nodes.is_empty() {
        out.push_str("\nPer node:\n");
        for node in &result.nodes {
            let dims: Vec<String> = node
                .classification
                .dimensions
                .iter()
                .map(|(name, grade)| format!("{name}={grade}"))
                .collect();
            out.push_str(&format!(
                "  {}  grade {} ({})\n",
                node.node,
                node.grade(),
                dims.join(", ")
            ));
        }
    }

    if !result.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for skipped in &result.skipped {
            out.push_str(&format!("  {}: {}\n", skipped.node, skipped.error));
        }
    }

    out
}

fn format_resources(resources: &ResourceList) -> String {
    if resources.is_empty() {
        return "-".to_string();
    }
    resources
        .iter()
        .map(|(name, quantity)| format!("{name}={quantity}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
