//! End-to-end pipeline integration tests
//!
//! Tests config loading → abstraction → PRISM export

use longitudinal_imdp_core::config::load_configs;
use longitudinal_imdp_core::*;
use std::fs;

/// Helper to load a configuration from fixtures
fn load_fixture(name: &str) -> AbstractionConfig {
    let path = format!("tests/fixtures/configs/{}.json", name);
    load_config(&path).expect("Failed to load config")
}

/// Run the pipeline exactly as the CLI does
fn run(config: &AbstractionConfig) -> IntervalMdp {
    config.validate().expect("Fixture should validate");
    let grid = config.build_grid().unwrap();
    let plant = config.build_plant().unwrap();
    let compiler = config.build_compiler();
    config
        .build_pipeline()
        .execute(&plant, &grid, compiler.as_ref())
        .expect("Pipeline failed")
}

#[test]
fn test_all_fixtures_load() {
    let configs = load_configs("tests/fixtures/configs").expect("Failed to load fixtures");
    let names: Vec<&str> = configs.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["debug_safe", "sink_industry", "world_physics_only"]);

    for (name, config) in &configs {
        assert!(config.validate().is_ok(), "{} should validate", name);
    }
}

#[test]
fn test_hybrid_model_layout() {
    let config = load_fixture("debug_safe");
    let mdp = run(&config);
    let text = mdp.to_prism();

    assert!(text.starts_with("// "));
    assert_eq!(text.matches("\nmdp\n").count(), 1);
    assert_eq!(text.matches("module Plant").count(), 1);
    assert_eq!(text.matches("module Controller_safe").count(), 1);
    assert_eq!(text.matches("formula do_").count(), 3);
    assert_eq!(text.matches("endmodule").count(), 2);

    // The controller module comes after the physics
    assert!(text.find("module Plant").unwrap() < text.find("formula do_brake_full").unwrap());

    // Every command line carries interval branches
    for line in text.lines().filter(|l| l.trim_start().starts_with("[") && l.contains("->")) {
        if line.contains("-> true;") {
            continue;
        }
        assert!(line.contains(" : (s'="), "Malformed command: {}", line);
        assert!(line.trim_end().ends_with(';'));
    }
}

#[test]
fn test_idempotent_artifacts() {
    let config = load_fixture("debug_safe");
    let first = run(&config).to_prism();
    let second = run(&config).to_prism();
    assert_eq!(first, second, "Two runs should give byte-identical output");
}

#[test]
fn test_parallel_matches_sequential() {
    let mut config = load_fixture("debug_safe");

    config.pipeline.parallel = false;
    let sequential = run(&config).to_prism();

    config.pipeline.parallel = true;
    let parallel = run(&config).to_prism();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_written_file_matches_rendering() {
    let config = load_fixture("world_physics_only");
    let mdp = run(&config);

    let path = std::env::temp_dir().join(format!("imdp_e2e_{}.prism", std::process::id()));
    mdp.write_prism(&path).expect("Failed to write model");
    let written = fs::read_to_string(&path).expect("Failed to read model back");
    let _ = fs::remove_file(&path);

    assert_eq!(written, mdp.to_prism());
}

#[test]
fn test_physics_only_custom_actions() {
    let config = load_fixture("world_physics_only");
    let grid = config.build_grid().unwrap();
    let mdp = run(&config);
    let text = mdp.to_prism();

    assert!(mdp.controller_logic().is_none());
    assert!(!text.contains("Controller_"));
    assert!(text.contains("[hold] s="));
    assert!(text.contains("[brake] s="));
    assert!(!text.contains("[coast]"));
    assert_eq!(mdp.num_states(), grid.total_cells());
}

#[test]
fn test_controller_needs_matching_actions() {
    let mut config = load_fixture("world_physics_only");
    config.controller.preset = Some(ThresholdPreset::Safe);

    assert!(config.validate().is_err());

    let grid = config.build_grid().unwrap();
    let plant = config.build_plant().unwrap();
    let compiler = config.build_compiler().unwrap();
    let result = config.build_pipeline().execute(&plant, &grid, Some(&compiler));
    assert!(matches!(result, Err(AbstractionError::Configuration(_))));
}

#[test]
fn test_sink_model_is_consistent() {
    let config = load_fixture("sink_industry");
    let grid = config.build_grid().unwrap();
    let mdp = run(&config);
    let sink = CellId(grid.total_cells());

    assert_eq!(grid.total_cells(), 11 * 7 * 13);
    assert_eq!(mdp.num_states(), grid.total_cells() + 1);
    assert_eq!(mdp.escape_state(), Some(sink));

    // Escape mass keeps every pair feasible
    assert!(mdp.validate().is_empty(), "{:?}", mdp.validate().first());

    // Cells at the grid border leak into the sink
    let leaks = mdp
        .sorted()
        .into_iter()
        .filter(|((source, _), entries)| {
            *source != sink && entries.iter().any(|e| e.target == sink)
        })
        .count();
    assert!(leaks > 0);

    let text = mdp.to_prism();
    assert!(text.contains(&format!("s : [0..{}] init ", grid.total_cells())));
    assert!(text.contains(&format!("label \"escaped\" = s={};", sink)));
    assert!(text.contains(&format!("[coast] s={} -> [1,1] : (s'={});", sink, sink)));
    assert!(text.contains("module Controller_industry"));

    // The sink's coast self-loop has a controller partner
    let coast = text.lines().find(|l| l.starts_with("formula do_coast")).unwrap();
    assert!(coast.contains(&format!("s={})", sink)), "{}", coast);

    let init = grid.flatten(
        &grid
            .state_to_index(&ContinuousState::new(30.0, 10.0, 0.0))
            .unwrap(),
    );
    assert_eq!(mdp.initial_state(), init);
}

#[test]
fn test_truncate_leaves_border_pairs_deficient() {
    let mut config = load_fixture("sink_industry");
    config.engine.boundary = BoundaryMode::Truncate;
    // Without widening, lost mass shows up as sum(p_max) < 1
    config.engine.conservatism = 0.0;
    let mdp = run(&config);

    assert!(mdp.escape_state().is_none());
    assert!(!mdp.to_prism().contains("escaped"));
    assert!(!mdp.validate().is_empty());
}
