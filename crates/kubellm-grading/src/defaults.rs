//! The default resource-model ladder.
//!
//! Used when a cluster declares no resource models. Grades 0 and 1 are
//! fixed; grades 2..=7 double at every rung; grade 8 is open-ended:
//!
//! | grade | cpu (cores)        | memory (GiB)           |
//! |-------|--------------------|------------------------|
//! | 0     | [0, 1)             | [0, 4)                 |
//! | 1     | [1, 2)             | [4, 16)                |
//! | g     | [2^(g-1), 2^g)     | [2^(g+2), 2^(g+3))     |
//! | 8     | [128, ∞)           | [1024, ∞)              |

use kubellm_cluster_api::{
    Quantity, RESOURCE_CPU, RESOURCE_MEMORY, ResourceModel, ResourceModelRange,
};

/// Number of rungs in the default ladder (grades `0..=8`).
pub const DEFAULT_GRADE_COUNT: u32 = 9;

const TERMINAL_GRADE: u32 = DEFAULT_GRADE_COUNT - 1;

/// Build the default 9-grade ladder.
pub fn default_resource_models() -> Vec<ResourceModel> {
    (0..DEFAULT_GRADE_COUNT).map(default_model).collect()
}

fn default_model(grade: u32) -> ResourceModel {
    // (cpu cores, memory GiB) bounds; `None` marks the open end.
    let (cpu, memory): ((i64, Option<i64>), (i64, Option<i64>)) = match grade {
        0 => ((0, Some(1)), (0, Some(4))),
        1 => ((1, Some(2)), (4, Some(16))),
        TERMINAL_GRADE => ((1 << (grade - 1), None), (1 << (grade + 2), None)),
        _ => (
            (1 << (grade - 1), Some(1 << grade)),
            (1 << (grade + 2), Some(1 << (grade + 3))),
        ),
    };

    ResourceModel::new(
        grade,
        vec![
            ResourceModelRange::new(
                RESOURCE_CPU,
                Quantity::from_units(cpu.0),
                cpu.1.map_or(Quantity::UNBOUNDED, Quantity::from_units),
            ),
            ResourceModelRange::new(
                RESOURCE_MEMORY,
                Quantity::gibibytes(memory.0),
                memory.1.map_or(Quantity::UNBOUNDED, Quantity::gibibytes),
            ),
        ],
    )
}
