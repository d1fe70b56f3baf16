//! End-to-end coverage of the scenarios in SPEC_FULL.md §8: write a small
//! `.solve` + `.pattern` fixture to a tempdir, call the library's `solve`
//! entry point directly, and check the emitted solution text.

use std::fs;
use std::path::Path;

use cold::context::{Context, Settings};
use cold::pool;

fn write_fixture(dir: &Path, solver: &str, patterns: &[(&str, &str)]) -> std::path::PathBuf {
    let solver_path = dir.join("case.solve");
    fs::write(&solver_path, solver).unwrap();

    let patterns_dir = dir.join("patterns");
    fs::create_dir_all(&patterns_dir).unwrap();
    for (name, body) in patterns {
        fs::write(patterns_dir.join(format!("{name}.pattern")), body).unwrap();
    }
    solver_path
}

fn default_settings(output_dir: std::path::PathBuf) -> Settings {
    Settings {
        threads: 1,
        output_dir,
        print_solutions: false,
        find_all: false,
        interactive: false,
        generated_log: false,
        combination_start: 0,
        combination_count: None,
    }
}

#[test]
fn scenario_a_trivial_literal() {
    let dir = tempfile::tempdir().unwrap();
    let solver = "\
        input z\n\
        depth 1\n\
        pattern literal\n\
        constant 7\n\
        case (0) => 7\n\
        case (1) => 7\n\
    ";
    let solver_path = write_fixture(dir.path(), solver, &[("literal", "let $x !c\n")]);

    let ctx = Context::load(&solver_path).unwrap();
    let output_dir = dir.path().join("out");
    let summary = pool::solve(ctx, default_settings(output_dir.clone())).unwrap();

    assert!(summary.solved);
    let solution = fs::read_to_string(output_dir.join("0").join("solution.cold")).unwrap();
    assert!(solution.contains("let $x 7"));
    assert!(solution.contains("ret"));
}

#[test]
fn scenario_b_identity() {
    let dir = tempfile::tempdir().unwrap();
    let solver = "\
        input z\n\
        depth 0\n\
        case (3) => 3\n\
        case (4) => 4\n\
    ";
    let solver_path = write_fixture(dir.path(), solver, &[]);

    let ctx = Context::load(&solver_path).unwrap();
    assert_eq!(ctx.combination_count(), 1);
    let output_dir = dir.path().join("out");
    let summary = pool::solve(ctx, default_settings(output_dir.clone())).unwrap();

    assert!(summary.solved);
    let solution = fs::read_to_string(output_dir.join("0").join("solution.cold")).unwrap();
    assert!(solution.contains("ret $z"));
}

#[test]
fn scenario_c_e_mc2() {
    let dir = tempfile::tempdir().unwrap();
    let solver = "\
        input z\n\
        precision 10000.0f\n\
        depth 3\n\
        pattern let\n\
        pattern mul\n\
        constant 300000000.0f\n\
        case (1.0f) => 90000000000000000.0f\n\
        case (86.18f) => 7756200000000001024.0f\n\
    ";
    let solver_path = write_fixture(
        dir.path(),
        solver,
        &[("let", "let $t !lc\n"), ("mul", "mul $t !l !lc\n")],
    );

    let ctx = Context::load(&solver_path).unwrap();
    let output_dir = dir.path().join("out");
    let summary = pool::solve(ctx, default_settings(output_dir.clone())).unwrap();

    assert!(summary.solved);
    let solution = fs::read_to_string(output_dir.join("0").join("solution.cold")).unwrap();
    // Depth 3 over {let, mul} is the combiner's actual reason for existing: the
    // solution composes a `let` binding with two `mul`s (z*c*c), not a single pattern.
    assert_eq!(solution.matches("mul").count(), 2);
    assert!(solution.contains("let $t"));
}

#[test]
fn scenario_d_commutativity_pruning_yields_one_solution_file_entry() {
    let dir = tempfile::tempdir().unwrap();
    let solver = "\
        input a\n\
        input b\n\
        depth 1\n\
        pattern arith\n\
        case (2, 3) => 5\n\
    ";
    let solver_path = write_fixture(dir.path(), solver, &[("arith", "add $a !l !l\n")]);

    let ctx = Context::load(&solver_path).unwrap();
    let output_dir = dir.path().join("out");
    let mut settings = default_settings(output_dir.clone());
    settings.find_all = true;
    let summary = pool::solve(ctx, settings).unwrap();

    assert!(summary.solved);
    let solution = fs::read_to_string(output_dir.join("0").join("solution.cold")).unwrap();
    // `add $t a b` and `add $t b a` are commutative duplicates of each
    // other, so only one instance of the solved program is ever emitted.
    assert_eq!(solution.matches("ret").count(), 1);
}

#[test]
fn scenario_e_float_tolerance_edge() {
    let dir = tempfile::tempdir().unwrap();
    let solver = "\
        input z\n\
        precision 0.5f\n\
        depth 1\n\
        pattern literal\n\
        constant 3.99f\n\
        case (2.0f) => 3.49f\n\
    ";
    let solver_path = write_fixture(dir.path(), solver, &[("literal", "let $x !c\n")]);

    let ctx = Context::load(&solver_path).unwrap();
    let output_dir = dir.path().join("out");
    let summary = pool::solve(ctx, default_settings(output_dir)).unwrap();

    assert!(summary.solved);
}

#[test]
fn threads_1_and_threads_4_agree_on_whether_a_solution_exists() {
    let dir = tempfile::tempdir().unwrap();
    let solver = "\
        input z\n\
        depth 2\n\
        pattern literal\n\
        constant 1\n\
        constant 2\n\
        case (0) => 2\n\
    ";
    let solver_path = write_fixture(dir.path(), solver, &[("literal", "let $x !c\n")]);

    for threads in [1, 4] {
        let ctx = Context::load(&solver_path).unwrap();
        let output_dir = dir.path().join(format!("out-{threads}"));
        let mut settings = default_settings(output_dir);
        settings.threads = threads;
        settings.find_all = true;
        let summary = pool::solve(ctx, settings).unwrap();
        assert!(summary.solved, "threads={threads}");
    }
}
