//! Grade histogram folding.
//!
//! Turns per-node grades into the `AllocatableModeling` list stored in
//! cluster status: one entry per observed grade, ascending, no zero counts.
//! Counting is a commutative sum, so partial histograms from independently
//! graded node batches can be merged with [`merge_modelings`].

use std::collections::BTreeMap;

use kubellm_cluster_api::AllocatableModeling;

use crate::classifier::NodeGrade;

/// Count graded nodes per grade.
pub fn aggregate<'a, I>(graded: I) -> Vec<AllocatableModeling>
where
    I: IntoIterator<Item = &'a NodeGrade>,
{
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for node in graded {
        *counts.entry(node.grade()).or_default() += 1;
    }
    into_modelings(counts)
}

/// Merge two histograms by summing counts per grade.
pub fn merge_modelings(
    left: &[AllocatableModeling],
    right: &[AllocatableModeling],
) -> Vec<AllocatableModeling> {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for modeling in left.iter().chain(right) {
        *counts.entry(modeling.grade).or_default() += modeling.count;
    }
    into_modelings(counts)
}

fn into_modelings(counts: BTreeMap<u32, u64>) -> Vec<AllocatableModeling> {
    counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(grade, count)| AllocatableModeling { grade, count })
        .collect()
}
