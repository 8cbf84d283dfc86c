//! Navigation scenario suite.
//!
//! Each scenario is a fixture pair under `fixtures/scenarios/`:
//! - `<name>.facts.json` -- fact snapshot
//! - `<name>.walk.json`  -- expected walk from the start of the flow
//!
//! The runner compiles `fixtures/flows/tax-flow.json`, walks it against the
//! snapshot, and compares the walk. It then checks that `previous` retraces
//! every step of the walk.

use std::path::PathBuf;

use screenflow_core::{compile_file, ItemBinding, ScreenIndex};
use screenflow_eval::{
    load_snapshot, BackOutcome, MemoryFactGraph, Navigator, NavigatorConfig, Position, WalkEnd,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("fixtures")
}

fn tax_flow() -> ScreenIndex {
    let path = fixtures_dir().join("flows").join("tax-flow.json");
    compile_file(&path).unwrap_or_else(|e| panic!("Failed to compile tax flow: {}", e))
}

fn scenario_facts(name: &str) -> MemoryFactGraph {
    let path = fixtures_dir()
        .join("scenarios")
        .join(format!("{}.facts.json", name));
    load_snapshot(&path).unwrap_or_else(|e| panic!("Failed to load facts for {}: {}", name, e))
}

/// Walk the flow and compare against `<name>.walk.json`.
fn run_walk_fixture(name: &str) {
    let index = tax_flow();
    let config = NavigatorConfig::default();
    let nav = Navigator::new(&index, &config);
    let facts = scenario_facts(name);

    let walk = nav
        .walk(&facts)
        .unwrap_or_else(|e| panic!("Walk failed for {}: {}", name, e));
    let actual = serde_json::to_value(&walk).unwrap();

    let expected_path = fixtures_dir()
        .join("scenarios")
        .join(format!("{}.walk.json", name));
    let expected_str = std::fs::read_to_string(&expected_path)
        .unwrap_or_else(|e| panic!("Failed to read expected walk for {}: {}", name, e));
    let expected: serde_json::Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|e| panic!("Invalid expected JSON for {}: {}", name, e));

    assert_eq!(
        actual,
        expected,
        "Walk mismatch for {}\n\nActual:\n{}\n\nExpected:\n{}",
        name,
        serde_json::to_string_pretty(&actual).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );

    // previous() retraces the walk
    for pair in walk.steps.windows(2) {
        let (a, b) = (&pair[0].position, &pair[1].position);
        assert_eq!(
            nav.previous(b, &facts).unwrap(),
            BackOutcome::Screen(a.clone()),
            "{}: previous({}) should be {}",
            name,
            b,
            a
        );
    }
    if let Some(first) = walk.steps.first() {
        assert_eq!(nav.previous(&first.position, &facts).unwrap(), BackOutcome::Start);
    }
}

// ──────────────────────────────────────────────
// Walk fixtures
// ──────────────────────────────────────────────

#[test]
fn single_w2() {
    run_walk_fixture("single-w2");
}

#[test]
fn unsupported_state() {
    run_walk_fixture("unsupported-state");
}

#[test]
fn married_separately() {
    run_walk_fixture("married-separately");
}

#[test]
fn w2_in_progress() {
    run_walk_fixture("w2-in-progress");
}

// ──────────────────────────────────────────────
// Knockout and section queries
// ──────────────────────────────────────────────

#[test]
fn knockout_state_follows_facts() {
    let index = tax_flow();
    let config = NavigatorConfig::default();
    let nav = Navigator::new(&index, &config);

    assert!(nav
        .is_knocked_out(&scenario_facts("unsupported-state"), None)
        .unwrap());
    assert!(nav
        .is_knocked_out(&scenario_facts("married-separately"), None)
        .unwrap());
    assert!(!nav.is_knocked_out(&scenario_facts("single-w2"), None).unwrap());

    // the filing-status knockout lies beyond the about-you section
    let reached = Position::top("/flow/you-and-your-family/about-you/dob");
    assert!(!nav
        .is_knocked_out(&scenario_facts("married-separately"), Some(&reached))
        .unwrap());
}

#[test]
fn jobs_section_tracks_w2_progress() {
    let index = tax_flow();
    let config = NavigatorConfig::default();
    let nav = Navigator::new(&index, &config);
    let none = ItemBinding::none();

    let done = scenario_facts("single-w2");
    // w2-A has no completion answer yet, so it is still in play
    assert!(!nav.section_complete("/flow/income/jobs", &done, &none).unwrap());
    assert!(nav.section_displayed("/flow/income/jobs", &done, &none).unwrap());
    let active = nav.assertions("/flow/income/jobs", &done, &none).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].i18n_key, "jobs.complete");

    let in_progress = scenario_facts("w2-in-progress");
    assert!(!nav
        .section_complete("/flow/income/jobs", &in_progress, &none)
        .unwrap());
    assert!(nav
        .assertions("/flow/income/jobs", &in_progress, &none)
        .unwrap()
        .is_empty());
}

#[test]
fn manual_screen_is_reachable_by_route_only() {
    let index = tax_flow();
    let facts = scenario_facts("single-w2");

    let config = NavigatorConfig::default();
    let nav = Navigator::new(&index, &config);
    let walk = nav.walk(&facts).unwrap();
    assert!(walk
        .steps
        .iter()
        .all(|d| d.position.route != "/flow/complete/sign/review"));
    assert_eq!(walk.end, WalkEnd::End);

    // Positioned on it explicitly, navigation carries on from there.
    let review = Position::top("/flow/complete/sign/review");
    let next = nav.next(&review, &facts).unwrap();
    assert_eq!(
        next.destination().unwrap().position.route,
        "/flow/complete/sign/sign"
    );
}
