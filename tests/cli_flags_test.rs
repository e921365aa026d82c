//! CLI flag contract tests
//!
//! Runs the faultline binary end to end: init scaffolding, sync with and
//! without contributions, coupling/summary/knowledge output, and flag
//! validation.

use std::path::Path;
use std::process::Command;

fn faultline_bin() -> String {
    env!("CARGO_BIN_EXE_faultline").to_string()
}

const EXPORT: &str = "START_HEADER\n\
    c1\n\
    alice\n\
    2023-05-01 10:00:00 +0000\n\
    add both #7\n\
    END_HEADER\n\
    A\tsrc/a.rs\n\
    A\tsrc/b.rs\n\
    \n\
    START_HEADER\n\
    c2\n\
    bob\n\
    2023-05-02 11:00:00 +0000\n\
    edit both #8\n\
    END_HEADER\n\
    M\tsrc/a.rs\n\
    M\tsrc/b.rs\n";

/// Working tree, export file, and annotation tree for a two-file project
fn setup_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/a.rs"), "fn a() {}\n").unwrap();
    std::fs::write(dir.path().join("src/b.rs"), "fn b() {}\n").unwrap();
    std::fs::write(dir.path().join("export.log"), EXPORT).unwrap();

    let annotations = dir.path().join("annotations/src");
    std::fs::create_dir_all(&annotations).unwrap();
    std::fs::write(
        annotations.join("a.rs"),
        "c1\t( alice 2023-05-01 1) fn a() {}\n",
    )
    .unwrap();
    std::fs::write(
        annotations.join("b.rs"),
        "c2\t( bob 2023-05-02 1) fn b() {}\n",
    )
    .unwrap();
    dir
}

fn run_faultline(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let mut cmd = Command::new(faultline_bin());
    cmd.arg("--path").arg(dir);
    for arg in args {
        cmd.arg(arg);
    }
    let output = cmd.output().expect("Failed to run faultline");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (code, stdout, stderr)
}

fn sync(dir: &Path, with_contributions: bool) {
    let export = dir.join("export.log");
    let annotations = dir.join("annotations");
    let mut args = vec!["sync", export.to_str().unwrap()];
    if with_contributions {
        args.push("--contributions");
        args.push("--annotations");
        args.push(annotations.to_str().unwrap());
    }
    let (code, stdout, stderr) = run_faultline(dir, &args);
    assert_eq!(
        code, 0,
        "sync should exit 0.\nstdout: {}\nstderr: {}",
        stdout, stderr
    );
}

// ============================================================================
// init
// ============================================================================

#[test]
fn test_init_scaffolds_project() {
    let dir = setup_project();
    let (code, stdout, _) = run_faultline(dir.path(), &["init"]);
    assert_eq!(code, 0, "init should exit 0");
    assert!(dir.path().join(".faultline").is_dir());
    assert!(dir.path().join("faultline.toml").is_file());
    assert!(stdout.contains("faultline sync"), "init should print next steps");

    // Second run leaves the existing config alone
    let (code, _, _) = run_faultline(dir.path(), &["init"]);
    assert_eq!(code, 0, "init should be idempotent");
}

// ============================================================================
// sync
// ============================================================================

#[test]
fn test_sync_imports_the_export() {
    let dir = setup_project();
    sync(dir.path(), false);

    assert!(dir.path().join(".faultline/history.log").is_file());
    assert!(
        !dir.path().join(".faultline/contributions.json").exists(),
        "no contribution cache without --contributions"
    );
}

#[test]
fn test_sync_with_contributions_builds_the_cache() {
    let dir = setup_project();
    sync(dir.path(), true);

    assert!(dir.path().join(".faultline/contributions.json").is_file());
    assert!(dir.path().join(".faultline/aliases").is_file());
}

#[test]
fn test_sync_rejects_a_broken_export() {
    let dir = setup_project();
    std::fs::write(dir.path().join("broken.log"), "no markers\n").unwrap();
    let broken = dir.path().join("broken.log");
    let (code, _, stderr) = run_faultline(dir.path(), &["sync", broken.to_str().unwrap()]);
    assert_ne!(code, 0, "sync of a broken export should fail");
    assert!(
        stderr.contains("no change sets"),
        "stderr should name the structural error, got: {}",
        stderr
    );
}

// ============================================================================
// coupling
// ============================================================================

#[test]
fn test_coupling_lists_pairs() {
    let dir = setup_project();
    sync(dir.path(), false);

    let (code, stdout, stderr) = run_faultline(dir.path(), &["coupling"]);
    assert_eq!(code, 0, "coupling should exit 0, stderr: {}", stderr);
    assert!(stdout.contains("src/a.rs"), "pair member missing: {}", stdout);
    assert!(stdout.contains("src/b.rs"), "pair member missing: {}", stdout);
}

#[test]
fn test_coupling_min_co_changes_filters_pairs() {
    let dir = setup_project();
    sync(dir.path(), false);

    let (code, stdout, _) =
        run_faultline(dir.path(), &["coupling", "--min-co-changes", "99"]);
    assert_eq!(code, 0);
    assert!(
        stdout.contains("No coupled pairs found"),
        "expected empty result, got: {}",
        stdout
    );
}

// ============================================================================
// summary
// ============================================================================

#[test]
fn test_summary_respects_top() {
    let dir = setup_project();
    sync(dir.path(), false);

    let (code, stdout, _) = run_faultline(dir.path(), &["summary", "--top", "1"]);
    assert_eq!(code, 0);
    assert!(
        stdout.contains("Showing top 1 files"),
        "expected one row, got: {}",
        stdout
    );
}

#[test]
fn test_summary_before_sync_asks_for_sync() {
    let dir = setup_project();
    let (code, _, stderr) = run_faultline(dir.path(), &["summary"]);
    assert_ne!(code, 0, "summary without a synced history should fail");
    assert!(
        stderr.contains("faultline sync"),
        "stderr should point at sync, got: {}",
        stderr
    );
}

// ============================================================================
// knowledge
// ============================================================================

#[test]
fn test_knowledge_shows_main_developers() {
    let dir = setup_project();
    sync(dir.path(), true);

    let (code, stdout, stderr) = run_faultline(dir.path(), &["knowledge"]);
    assert_eq!(code, 0, "knowledge should exit 0, stderr: {}", stderr);
    assert!(stdout.contains("alice"), "main developer missing: {}", stdout);
    assert!(stdout.contains("bob"), "main developer missing: {}", stdout);

    let (code, stdout, _) = run_faultline(dir.path(), &["knowledge", "--developers"]);
    assert_eq!(code, 0);
    assert!(
        stdout.contains("Files owned"),
        "developers listing missing: {}",
        stdout
    );
}

#[test]
fn test_knowledge_without_cache_asks_for_resync() {
    let dir = setup_project();
    sync(dir.path(), false);

    let (code, _, stderr) = run_faultline(dir.path(), &["knowledge"]);
    assert_ne!(code, 0, "knowledge without a contribution cache should fail");
    assert!(
        stderr.contains("resynchronize"),
        "stderr should ask for a resync, got: {}",
        stderr
    );
}

// ============================================================================
// flag validation
// ============================================================================

#[test]
fn test_workers_flag_is_validated() {
    let dir = setup_project();
    let export = dir.path().join("export.log");

    let (code, _, stderr) = run_faultline(
        dir.path(),
        &["sync", export.to_str().unwrap(), "--workers", "0"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("workers must be at least 1"), "got: {}", stderr);

    let (code, _, stderr) = run_faultline(
        dir.path(),
        &["sync", export.to_str().unwrap(), "--workers", "65"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("workers cannot exceed 64"), "got: {}", stderr);
}

#[test]
fn test_version_prints_the_crate_version() {
    let dir = setup_project();
    let (code, stdout, _) = run_faultline(dir.path(), &["version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("faultline"));
}
