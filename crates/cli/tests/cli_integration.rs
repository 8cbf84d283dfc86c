//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `screenflow` binary and verify
//! exit codes, stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to the fixture flows and snapshots resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FLOW: &str = "fixtures/flows/tax-flow.json";
const SINGLE_W2: &str = "fixtures/scenarios/single-w2.facts.json";
const IN_PROGRESS: &str = "fixtures/scenarios/w2-in-progress.facts.json";
const UNSUPPORTED: &str = "fixtures/scenarios/unsupported-state.facts.json";

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `screenflow` binary, rooted at workspace.
fn screenflow() -> Command {
    let mut cmd = cargo_bin_cmd!("screenflow");
    cmd.current_dir(workspace_root());
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let out = screenflow().args(args).output().unwrap();
    assert!(
        out.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap()
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    screenflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("navigation queries"));
}

#[test]
fn version_exits_0() {
    screenflow()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("screenflow"));
}

#[test]
fn next_requires_facts_and_route() {
    screenflow()
        .args(["next", FLOW])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--facts"));
}

// ──────────────────────────────────────────────
// 2. Compile and validate
// ──────────────────────────────────────────────

#[test]
fn compile_lists_screens() {
    screenflow()
        .args(["compile", FLOW])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/flow/income/jobs/box-2  in /formW2s  if isTrue:/formW2s/*/hasBox2",
        ))
        .stdout(predicate::str::contains("fingerprint: "));
}

#[test]
fn compile_json_carries_index() {
    let json = stdout_json(&["--output", "json", "compile", FLOW]);
    assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);
    let entries = json["index"]["entries"].as_array().unwrap();
    assert_eq!(entries[0]["route"], "/flow/you-and-your-family/about-you/intro");
}

#[test]
fn compile_duplicate_route_exits_1() {
    let tmp = TempDir::new().unwrap();
    let flow = tmp.path().join("dup.json");
    fs::write(
        &flow,
        r#"{ "children": [{ "kind": "category", "route": "c", "children": [{
            "kind": "subcategory", "route": "s", "children": [
              { "kind": "screen", "route": "q" },
              { "kind": "screen", "route": "q" }
            ]}]}]}"#,
    )
    .unwrap();

    screenflow()
        .args(["compile", flow.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/flow/c/s/q"));

    let out = screenflow()
        .args(["--output", "json", "compile", flow.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(err["kind"], "duplicate_route");
}

#[test]
fn compile_missing_file_exits_1() {
    screenflow()
        .args(["compile", "fixtures/flows/no-such-flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-flow.json"));
}

#[test]
fn validate_fixture_flow() {
    screenflow()
        .args(["validate", FLOW])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_rejects_unknown_kind() {
    let tmp = TempDir::new().unwrap();
    let flow = tmp.path().join("bad.json");
    fs::write(&flow, r#"{ "children": [{ "kind": "page", "route": "x" }] }"#).unwrap();
    screenflow()
        .args(["validate", flow.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid flow"));
}

// ──────────────────────────────────────────────
// 3. Navigation queries
// ──────────────────────────────────────────────

#[test]
fn next_skips_unanswered_box_2() {
    screenflow()
        .args([
            "next",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--route",
            "/flow/income/jobs/box-1",
            "--item",
            "w2-A",
        ])
        .assert()
        .success()
        .stdout("/flow/income/jobs/w2-review [w2-A]\n");
}

#[test]
fn next_json_reports_knockout() {
    let json = stdout_json(&[
        "--output",
        "json",
        "next",
        FLOW,
        "--facts",
        UNSUPPORTED,
        "--route",
        "/flow/you-and-your-family/about-you/state",
    ]);
    assert_eq!(json["outcome"], "screen");
    assert_eq!(json["route"], "/flow/you-and-your-family/about-you/state-ko");
    assert_eq!(json["terminal"], true);
}

#[test]
fn previous_at_start() {
    screenflow()
        .args([
            "previous",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--route",
            "/flow/you-and-your-family/about-you/intro",
        ])
        .assert()
        .success()
        .stdout("start\n");
}

#[test]
fn missing_item_binding_exits_1() {
    let out = screenflow()
        .args([
            "--output",
            "json",
            "next",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--route",
            "/flow/income/jobs/box-1",
        ])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(err["kind"], "missing_item_binding");
}

#[test]
fn unknown_route_exits_1() {
    screenflow()
        .args([
            "next",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--route",
            "/flow/nowhere",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown route: /flow/nowhere"));
}

#[test]
fn bad_snapshot_exits_1() {
    let tmp = TempDir::new().unwrap();
    let facts = tmp.path().join("facts.json");
    fs::write(&facts, "[1, 2, 3]").unwrap();
    screenflow()
        .args([
            "walk",
            FLOW,
            "--facts",
            facts.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("facts.json"));
}

// ──────────────────────────────────────────────
// 4. Walk, knockout, section, explain
// ──────────────────────────────────────────────

#[test]
fn walk_text_ends_with_summary() {
    screenflow()
        .args(["walk", FLOW, "--facts", UNSUPPORTED])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/flow/you-and-your-family/about-you/state-ko (knockout)",
        ))
        .stdout(predicate::str::contains("-- 4 screens, knocked out"));
}

#[test]
fn walk_json_matches_fixture() {
    let json = stdout_json(&["--output", "json", "walk", FLOW, "--facts", IN_PROGRESS]);
    let expected: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(workspace_root().join("fixtures/scenarios/w2-in-progress.walk.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(json, expected);
}

#[test]
fn walk_limit_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("screenflow.toml");
    fs::write(&config, "[navigator]\nmax_walk_steps = 3\n").unwrap();
    screenflow()
        .args([
            "--config",
            config.to_str().unwrap(),
            "walk",
            FLOW,
            "--facts",
            SINGLE_W2,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("walk exceeded 3 steps"));
}

#[test]
fn max_walk_steps_flag_overrides_config() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("screenflow.toml");
    fs::write(&config, "[navigator]\nmax_walk_steps = 3\n").unwrap();
    screenflow()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--max-walk-steps",
            "100",
            "walk",
            FLOW,
            "--facts",
            SINGLE_W2,
        ])
        .assert()
        .success();
}

#[test]
fn bad_config_exits_1() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("screenflow.toml");
    fs::write(&config, "[navigator]\nmax_steps = 3\n").unwrap();
    screenflow()
        .args([
            "--config",
            config.to_str().unwrap(),
            "walk",
            FLOW,
            "--facts",
            SINGLE_W2,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("screenflow.toml"));
}

#[test]
fn knockout_query() {
    screenflow()
        .args(["knockout", FLOW, "--facts", UNSUPPORTED])
        .assert()
        .success()
        .stdout("knocked out\n");
    screenflow()
        .args([
            "knockout",
            FLOW,
            "--facts",
            UNSUPPORTED,
            "--reached",
            "/flow/you-and-your-family/about-you/name",
        ])
        .assert()
        .success()
        .stdout("not knocked out\n");
}

#[test]
fn section_json() {
    let json = stdout_json(&[
        "--output",
        "json",
        "section",
        FLOW,
        "--facts",
        SINGLE_W2,
        "--section",
        "/flow/income/jobs",
    ]);
    assert_eq!(json["complete"], false);
    assert_eq!(json["displayed"], true);
    assert_eq!(json["assertions"][0]["i18nKey"], "jobs.complete");
    assert_eq!(json["assertions"][0]["type"], "success");
}

#[test]
fn section_text() {
    screenflow()
        .args([
            "section",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--section",
            "/flow/income/jobs",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete:  no"))
        .stdout(predicate::str::contains(
            "assert:    success jobs.complete (edit /flow/income/jobs/w2-hub)",
        ));
}

#[test]
fn unknown_section_exits_1() {
    screenflow()
        .args([
            "section",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--section",
            "/flow/nope",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown section"));
}

#[test]
fn explain_shows_failing_condition() {
    screenflow()
        .args([
            "explain",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--route",
            "/flow/income/jobs/box-2",
            "--item",
            "w2-A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[FAIL] isTrue:/formW2s/*/hasBox2"))
        .stdout(predicate::str::contains("/formW2s/#w2-A/hasBox2 = false"))
        .stdout(predicate::str::contains("=> hidden"));
}

#[test]
fn quiet_suppresses_text_errors() {
    screenflow()
        .args([
            "--quiet",
            "next",
            FLOW,
            "--facts",
            SINGLE_W2,
            "--route",
            "/flow/nowhere",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}
