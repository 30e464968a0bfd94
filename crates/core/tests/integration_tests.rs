//! Integration tests for tryspace-core
//!
//! These tests run the scan → rank pipeline end-to-end against real
//! directories and check the emitted scripts for complete flows.

use std::fs::{self, File};

use chrono::Local;
use tryspace_core::naming::{date_prefix, resolve_unique_name_with_versioning};
use tryspace_core::script::{render_script, script_delete, script_mkdir_cd, SCRIPT_WARNING};
use tryspace_core::tries::{load_try_dirs, rank_try_dirs, DeleteTarget};

use tempfile::TempDir;

/// Scanning a populated base directory and ranking with an empty query keeps
/// every directory, skipping hidden entries and plain files.
#[test]
fn test_scan_and_rank_whole_directory() {
    let base = TempDir::new().unwrap();
    fs::create_dir(base.path().join("2024-01-01-alpha")).unwrap();
    fs::create_dir(base.path().join("2024-03-05-beta-app")).unwrap();
    fs::create_dir(base.path().join("plain-workspace")).unwrap();
    fs::create_dir(base.path().join(".hidden")).unwrap();
    File::create(base.path().join("notes.txt")).unwrap();

    let all = load_try_dirs(base.path());
    assert_eq!(all.len(), 3);

    let ranked = rank_try_dirs(&all, "", Local::now());
    assert_eq!(ranked.len(), 3);

    // Every entry scored: freshly created directories get at least the
    // recency bonus, date-prefixed ones the date bonus on top.
    for try_dir in &ranked {
        assert!(try_dir.score > 0.0, "{} scored zero", try_dir.base_name);
    }

    let alpha = ranked
        .iter()
        .find(|t| t.base_name == "2024-01-01-alpha")
        .unwrap();
    let plain = ranked
        .iter()
        .find(|t| t.base_name == "plain-workspace")
        .unwrap();
    assert!(alpha.score > plain.score);
}

/// A query narrows the ranked list to subsequence matches only.
#[test]
fn test_rank_filters_non_matches() {
    let base = TempDir::new().unwrap();
    fs::create_dir(base.path().join("2024-01-01-parser")).unwrap();
    fs::create_dir(base.path().join("2024-01-02-renderer")).unwrap();

    let all = load_try_dirs(base.path());
    let ranked = rank_try_dirs(&all, "pars", Local::now());

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].base_name, "2024-01-01-parser");
}

/// Unique-name resolution sees directories the scan produced.
#[test]
fn test_new_names_avoid_scanned_directories() {
    let base = TempDir::new().unwrap();
    let prefix = date_prefix(Local::now());
    fs::create_dir(base.path().join(format!("{prefix}-demo"))).unwrap();

    let slug = resolve_unique_name_with_versioning(base.path(), &prefix, "demo");
    assert_eq!(slug, "demo-2");

    let script = script_mkdir_cd(&base.path().join(format!("{prefix}-{slug}")));
    assert!(script[0].starts_with("mkdir -p "));
    assert!(script[0].ends_with(&format!("{prefix}-demo-2'")));
}

/// The delete script only ever touches the scanned basenames, from inside
/// the base directory.
#[test]
fn test_delete_script_from_scanned_entries() {
    let base = TempDir::new().unwrap();
    fs::create_dir(base.path().join("2024-01-01-doomed")).unwrap();

    let all = load_try_dirs(base.path());
    let targets: Vec<DeleteTarget> = all
        .iter()
        .map(|t| DeleteTarget {
            path: t.path.clone(),
            base_name: t.base_name.clone(),
        })
        .collect();

    let cmds = script_delete(&targets, base.path());
    let rendered = render_script(&cmds);

    assert!(rendered.starts_with(SCRIPT_WARNING));
    assert!(rendered.contains("rm -rf '2024-01-01-doomed'"));
    assert!(!rendered.contains(&format!("rm -rf '{}", base.path().display())));
}
