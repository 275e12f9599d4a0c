//! End-to-end grading properties.
//!
//! Exercises the public API the way the cluster status controller uses it:
//! resolve a ladder, grade a node snapshot, fold the histogram.

use kubellm_cluster_api::*;
use kubellm_grading::*;

const GIB: i128 = 1 << 30;

fn node(name: &str, cpu_millis: i128, memory_bytes: i128) -> NodeSnapshot {
    NodeSnapshot::new(name)
        .with_allocatable(RESOURCE_CPU, Quantity::from_millis(cpu_millis))
        .with_allocatable(RESOURCE_MEMORY, Quantity::from_millis(memory_bytes * 1000))
}

fn grade(cpu_millis: i128, memory_bytes: i128) -> u32 {
    classify_node(
        &node("n", cpu_millis, memory_bytes),
        &GradeScheme::default_ladder(),
        &GradingSettings::default(),
    )
    .unwrap()
    .grade()
}

fn fleet() -> Vec<NodeSnapshot> {
    (0..120)
        .map(|i: i128| {
            let cpu = (i * 1733) % 300_000;
            let memory = ((i * 7919) % 2500) * GIB / 2;
            node(&format!("node-{i}"), cpu, memory)
        })
        .collect()
}

#[test]
fn below_one_core_and_four_gib_is_grade_zero() {
    for cpu in (0..1000).step_by(37) {
        for memory in [0, 1, GIB, 3 * GIB, 4 * GIB - 1] {
            assert_eq!(grade(cpu, memory), 0, "cpu={cpu}m memory={memory}");
        }
    }
}

#[test]
fn at_least_128_cores_is_grade_eight() {
    let scheme = GradeScheme::default_ladder();
    for cores in [128, 129, 256, 1 << 20, i64::MAX as i128] {
        let hit = scheme.locate(RESOURCE_CPU, Quantity::from_millis(cores * 1000)).unwrap();
        assert_eq!(scheme.grade_at(hit.index), 8, "cores={cores}");
    }
    assert_eq!(grade(200_000, 2048 * GIB), 8);
}

fn assert_single_match(scheme: &GradeScheme, name: &str, quantity: Quantity) {
    let models = scheme.models();
    let last = models.len() - 1;
    let matching: Vec<usize> = models
        .iter()
        .enumerate()
        .filter(|(index, model)| {
            let range = model.range(name).unwrap();
            let min = if *index == 0 { Quantity::ZERO } else { range.min };
            min <= quantity && (*index == last || quantity < range.max)
        })
        .map(|(index, _)| index)
        .collect();

    assert_eq!(matching.len(), 1, "{name}={quantity} matched {matching:?}");
    let hit = scheme.locate(name, quantity).unwrap();
    assert_eq!(hit.index, matching[0], "{name}={quantity}");
    assert!(!hit.in_gap);
}

#[test]
fn exactly_one_grade_matches_each_dimension() {
    let scheme = GradeScheme::default_ladder();

    for millis in (0..300_000).step_by(251) {
        assert_single_match(&scheme, RESOURCE_CPU, Quantity::from_millis(millis));
    }

    // Quarter-GiB steps up to 2 TiB land on every boundary; one byte short
    // of each boundary is checked too.
    for quarters in 0..(2048 * 4) {
        let bytes = quarters * GIB / 4;
        assert_single_match(&scheme, RESOURCE_MEMORY, Quantity::from_millis(bytes * 1000));
        if bytes > 0 {
            assert_single_match(
                &scheme,
                RESOURCE_MEMORY,
                Quantity::from_millis((bytes - 1) * 1000),
            );
        }
    }
}

#[test]
fn storage_dimensions_grade_like_any_other() {
    let tier = |grade: u32, storage: (i64, i64), ephemeral: (i64, i64)| {
        ResourceModel::new(
            grade,
            vec![
                ResourceModelRange::new(
                    RESOURCE_STORAGE,
                    Quantity::gibibytes(storage.0),
                    Quantity::gibibytes(storage.1),
                ),
                ResourceModelRange::new(
                    RESOURCE_EPHEMERAL_STORAGE,
                    Quantity::gibibytes(ephemeral.0),
                    Quantity::gibibytes(ephemeral.1),
                ),
            ],
        )
    };
    let config = GradingConfig {
        resource_models: Some(vec![
            tier(0, (0, 100), (0, 20)),
            tier(1, (100, 1000), (20, 200)),
            tier(2, (1000, 1000), (200, 200)),
        ]),
        ..Default::default()
    };

    let nodes = vec![
        NodeSnapshot::new("db")
            .with_allocatable(RESOURCE_STORAGE, Quantity::gibibytes(4000))
            .with_allocatable(RESOURCE_EPHEMERAL_STORAGE, Quantity::gibibytes(500)),
        NodeSnapshot::new("cache")
            .with_allocatable(RESOURCE_STORAGE, Quantity::gibibytes(50))
            .with_allocatable(RESOURCE_EPHEMERAL_STORAGE, Quantity::gibibytes(50)),
        NodeSnapshot::new("web").with_allocatable(RESOURCE_CPU, Quantity::from_units(4)),
    ];

    let result = grade_cluster(&config, &nodes).unwrap();
    assert_eq!(result.nodes[0].grade(), 2);
    assert!(result.nodes[0].classification.full_match);
    // storage says 0, ephemeral-storage says 1; highest wins by default.
    assert_eq!(result.nodes[1].grade(), 1);
    assert_eq!(result.nodes[1].classification.dimensions[RESOURCE_STORAGE], 0);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].node, "web");
}

#[test]
fn documented_examples() {
    assert_eq!(grade(3000, 20 * GIB), 2);
    assert_eq!(grade(200_000, 2048 * GIB), 8);

    let config = GradingConfig {
        resource_models: Some(Vec::new()),
        ..Default::default()
    };
    let err = grade_cluster(&config, &fleet()).unwrap_err();
    assert!(matches!(err, GradingError::EmptyScheme));
}

#[test]
fn counts_sum_to_graded_nodes() {
    let mut nodes = fleet();
    nodes.push(node("bad", -1, GIB));
    nodes.push(
        node("gpu", 4000, 8 * GIB).with_allocatable("nvidia.com/gpu", Quantity::from_units(1)),
    );

    let result = grade_cluster(&GradingConfig::default(), &nodes).unwrap();
    let counted: u64 = result
        .resource_summary
        .allocatable_modelings
        .iter()
        .map(|m| m.count)
        .sum();

    assert_eq!(result.skipped_count(), 2);
    assert_eq!(counted as usize, result.graded_count());
    assert_eq!(result.graded_count() + result.skipped_count(), nodes.len());
}

#[test]
fn repeated_passes_are_identical() {
    let nodes = fleet();
    let first = grade_cluster(&GradingConfig::default(), &nodes).unwrap();
    let second = grade_cluster(&GradingConfig::default(), &nodes).unwrap();
    assert_eq!(first, second);

    let grades: Vec<u32> = first
        .resource_summary
        .allocatable_modelings
        .iter()
        .map(|m| m.grade)
        .collect();
    let mut sorted = grades.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(grades, sorted);
}

#[test]
fn parallel_batches_merge_to_the_same_histogram() {
    let nodes = fleet();
    let scheme = GradeScheme::default_ladder();
    let settings = GradingSettings::default();

    let whole = summarize(&nodes, &scheme, &settings);

    let partials: Vec<Vec<AllocatableModeling>> = std::thread::scope(|scope| {
        let handles: Vec<_> = nodes
            .chunks(17)
            .map(|batch| {
                let scheme = &scheme;
                let settings = &settings;
                scope.spawn(move || {
                    summarize(batch, scheme, settings)
                        .resource_summary
                        .allocatable_modelings
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let merged = partials
        .iter()
        .fold(Vec::new(), |acc, part| merge_modelings(&acc, part));
    assert_eq!(merged, whole.resource_summary.allocatable_modelings);
}

#[test]
fn custom_ladder_from_toml() {
    let toml_str = r#"
[grading]
reconcile = "lowest"
unknown_resources = "ignore"

[[resource_models]]
grade = 10
ranges = [
    { name = "cpu", min = "0", max = "4" },
    { name = "memory", min = "0", max = "16Gi" },
]

[[resource_models]]
grade = 20
ranges = [
    { name = "cpu", min = "4", max = "32" },
    { name = "memory", min = "16Gi", max = "128Gi" },
]

[[resource_models]]
grade = 30
ranges = [
    { name = "cpu", min = "32", max = "33" },
    { name = "memory", min = "128Gi", max = "129Gi" },
]
"#;
    let config = GradingConfig::from_toml_str(toml_str).unwrap();

    let nodes = vec![
        node("small", 2000, 8 * GIB),
        node("mixed", 48_000, 64 * GIB),
        node("large", 64_000, 512 * GIB)
            .with_allocatable("pods", Quantity::from_units(110)),
        node("busy", 64_000, 512 * GIB)
            .with_allocated(RESOURCE_CPU, Quantity::from_units(62))
            .with_allocated(RESOURCE_MEMORY, Quantity::gibibytes(500)),
    ];

    let result = grade_cluster(&config, &nodes).unwrap();
    let grades: Vec<(String, u32)> = result
        .nodes
        .iter()
        .map(|n| (n.node.clone(), n.grade()))
        .collect();

    assert_eq!(
        grades,
        vec![
            ("small".to_string(), 10),
            // cpu says 30, memory says 20; lowest wins.
            ("mixed".to_string(), 20),
            ("large".to_string(), 30),
            // 2 free cores, 12 GiB free memory.
            ("busy".to_string(), 10),
        ]
    );
    assert_eq!(
        result.resource_summary.allocatable_modelings,
        vec![
            AllocatableModeling { grade: 10, count: 2 },
            AllocatableModeling { grade: 20, count: 1 },
            AllocatableModeling { grade: 30, count: 1 },
        ]
    );
    assert_eq!(result.resource_summary.allocated[RESOURCE_CPU], Quantity::from_units(62));
}

#[test]
fn non_contiguous_ladder_follows_gap_policy() {
    let toml_str = r#"
[grading]
gaps = "reject"

[[resource_models]]
grade = 0
ranges = [{ name = "cpu", min = "0", max = "2" }]

[[resource_models]]
grade = 1
ranges = [{ name = "cpu", min = "4", max = "8" }]
"#;
    let mut config = GradingConfig::from_toml_str(toml_str).unwrap();
    assert!(matches!(config.scheme(), Err(GradingError::Gap { .. })));

    config.grading.gaps = GapPolicy::NearestLower;
    let nodes = vec![NodeSnapshot::new("n").with_allocatable(RESOURCE_CPU, Quantity::from_units(3))];
    let result = grade_cluster(&config, &nodes).unwrap();
    assert_eq!(result.nodes[0].grade(), 0);
    assert!(!result.nodes[0].classification.full_match);
}
