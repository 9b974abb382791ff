use brilopt::bril::{program_to_text, Program};
use brilopt::ir::analysis::{compute_dominators, reaching_definitions, DominanceKind};
use brilopt::ir::optimizer::{apply_lvn_to_program, eliminate_dead_assignments};
use brilopt::ir::{build_blocks, group_basic_blocks};
use brilopt::{Config, WorklistOrder};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn load_fixture(name: &str) -> Program {
    let project_path = std::env!("CARGO_MANIFEST_DIR");
    let fixture_file = format!("{}/tests/fixtures/{}.json", project_path, name);
    let contents = std::fs::read_to_string(&fixture_file).expect("Failed to read fixture file");

    Program::from_json(&contents).unwrap()
}

fn rows(rows: &[u32]) -> BTreeSet<u32> {
    rows.iter().copied().collect()
}

#[test]
fn test_blocks_of_loop() {
    let program = load_fixture("loop_sum");
    let blocks = group_basic_blocks(&program);
    let labels: Vec<&str> = blocks["main"].iter().map(|b| b.get_label()).collect();

    assert_eq!(vec!["main.start", "loop", "body", "done"], labels);
}

#[test]
fn test_reaching_definitions_of_loop() {
    let program = load_fixture("loop_sum");

    for args in [vec!["brilopt"], vec!["brilopt", "--worklist", "dedup"]] {
        let config = Config::try_from(args).unwrap();
        let defs = reaching_definitions(&program, &config);
        let main = &defs["main"];

        assert_eq!(rows(&[2, 10]), main[&6]["i"]);
        assert_eq!(rows(&[3, 9]), main[&6]["sum"]);
        assert_eq!(rows(&[1]), main[&6]["n"]);
        assert_eq!(rows(&[3, 9]), main[&14]["sum"]);
        assert_eq!(rows(&[2, 10]), main[&9]["i"]);
    }
}

#[test]
fn test_dominators_of_loop() {
    let program = load_fixture("loop_sum");
    let blocks = build_blocks(&program.functions[0]);
    let config = Config {
        worklist: WorklistOrder::Dedup,
        ..Config::default()
    };
    let doms = compute_dominators(&blocks, DominanceKind::Strict, &config).unwrap();

    assert_eq!(vec!["main.start", "loop"], doms["body"]);
    assert_eq!(vec!["main.start", "loop"], doms["done"]);
    assert_eq!(vec!["main.start"], doms["loop"]);
}

#[test]
fn test_dce_removes_unused_constant() {
    let program = load_fixture("loop_sum");
    let result = eliminate_dead_assignments(&program, &Config::default()).unwrap();

    assert_eq!(2, result.passes.len());
    assert_eq!(program, result.passes[0]);
    assert!(!program_to_text(&result.converged).contains("unused"));
    assert_eq!(
        program.functions[0].instrs.len() - 1,
        result.converged.functions[0].instrs.len()
    );
}

#[test]
fn test_lvn_keeps_loop_unchanged() {
    let program = load_fixture("loop_sum");
    let result = apply_lvn_to_program(&program, &Config::default()).unwrap();

    assert_eq!(program, result);
}

#[test]
fn test_json_round_trip() {
    let program = load_fixture("loop_sum");
    let json = program.to_json().unwrap();

    assert_eq!(program, Program::from_json(&json).unwrap());
}

#[test]
fn test_unresolved_label() {
    let program = Program::from_json(
        r#"{"functions": [{"name": "main", "instrs": [{"op": "jmp", "labels": ["nowhere"]}]}]}"#,
    )
    .unwrap();
    let config = Config::default();

    assert!(reaching_definitions(&program, &config)["main"].is_empty());
    assert!(eliminate_dead_assignments(&program, &config).is_err());

    let blocks = build_blocks(&program.functions[0]);
    let err = compute_dominators(&blocks, DominanceKind::NonStrict, &config).unwrap_err();
    assert!(err.is_malformed_graph());
}

#[test]
fn test_invalid_json() {
    assert!(Program::from_json("{\"functions\": 3}").is_err());
}
