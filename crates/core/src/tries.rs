//! Try directory candidates: loading and per-frame ranking.
//!
//! A `TryDir` is one immediate child directory of the tries base path. The
//! listing is read once per picker session and cached by the caller; scores
//! are recomputed from the live query every frame.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::debug;

use crate::fuzzy;

/// One directory entry eligible for selection.
#[derive(Debug, Clone)]
pub struct TryDir {
    /// Decorated name shown on full-screen listings
    pub name: String,
    /// Directory basename, the string that is fuzzy-matched
    pub base_name: String,
    /// Absolute path, the identity key of the entry
    pub path: PathBuf,
    pub created: Option<DateTime<Local>>,
    pub modified: Option<DateTime<Local>>,
    /// Recomputed from the current query every frame
    pub score: f64,
}

/// A validated deletion target: the resolved path and the basename the
/// delete script removes relative to the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub path: PathBuf,
    pub base_name: String,
}

fn timestamp(time: std::io::Result<std::time::SystemTime>) -> Option<DateTime<Local>> {
    time.ok().map(DateTime::<Local>::from)
}

/// Loads all candidate directories under `base`.
///
/// Hidden entries are skipped, non-directories are skipped, and entries that
/// cannot be stat'ed are skipped rather than failing the scan. An unreadable
/// base directory yields an empty list.
pub fn load_try_dirs(base: &Path) -> Vec<TryDir> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("unable to read tries directory {}: {e}", base.display());
            return Vec::new();
        }
    };

    let mut tries = Vec::new();

    for entry in entries.flatten() {
        let base_name = entry.file_name().to_string_lossy().to_string();
        if base_name.starts_with('.') {
            continue;
        }

        let path = entry.path();

        // Follows symlinks so a linked directory still shows up; the delete
        // containment check re-resolves the real path later.
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if !metadata.is_dir() {
            continue;
        }

        tries.push(TryDir {
            name: format!("\u{1f4c1} {base_name}"),
            base_name,
            path,
            created: timestamp(metadata.created()),
            modified: timestamp(metadata.modified()),
            score: 0.0,
        });
    }

    tries
}

/// Scores every candidate against `query` and returns the ranked list.
///
/// With a non-empty query, zero-scored candidates (non-matches) are dropped.
/// The sort is stable and descending, so candidates with equal scores keep
/// their input order.
pub fn rank_try_dirs(all_tries: &[TryDir], query: &str, now: DateTime<Local>) -> Vec<TryDir> {
    let query_lower = query.to_lowercase();

    let mut scored: Vec<TryDir> = all_tries
        .iter()
        .map(|try_dir| {
            let mut scored = try_dir.clone();
            scored.score = fuzzy::calculate_score(&scored.base_name, &query_lower, scored.modified, now);
            scored
        })
        .filter(|try_dir| query.is_empty() || try_dir.score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}
