//! Directory-name generation for new tries.
//!
//! New workspaces are named `YYYY-MM-DD-<slug>`; clones derive the slug from
//! the git URI, worktrees from the source repository. Collisions are resolved
//! with numeric suffix versioning.

use std::path::Path;

use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::error::{Error, Result};

/// Components of a parsed git URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUri {
    pub user: String,
    pub repo: String,
    pub host: String,
}

/// Formats the date prefix used by every generated directory name.
pub fn date_prefix(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Collapses whitespace runs in `text` into single dashes.
pub fn slugify(text: &str) -> String {
    text.split_whitespace().join("-")
}

/// Returns true if `arg` looks like a git URI rather than a search query.
pub fn is_git_uri(arg: &str) -> bool {
    arg.starts_with("http://")
        || arg.starts_with("https://")
        || arg.starts_with("git@")
        || arg.contains("github.com")
        || arg.contains("gitlab.com")
        || arg.ends_with(".git")
}

/// Parses a git URI into host, user and repository.
///
/// Supports `https://host/user/repo` and `git@host:user/repo`, with an
/// optional `.git` suffix.
pub fn parse_git_uri(uri: &str) -> Option<GitUri> {
    let uri = uri.strip_suffix(".git").unwrap_or(uri);

    let non_empty = |s: &str| !s.is_empty();

    if let Some(rest) = uri
        .strip_prefix("https://")
        .or_else(|| uri.strip_prefix("http://"))
    {
        let mut parts = rest.split('/').filter(|s| non_empty(s));
        let host = parts.next()?;
        let user = parts.next()?;
        let repo = parts.next()?;
        return Some(GitUri {
            user: user.to_string(),
            repo: repo.to_string(),
            host: host.to_string(),
        });
    }

    if let Some(rest) = uri.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        let mut parts = path.split('/').filter(|s| non_empty(s));
        let user = parts.next()?;
        let repo = parts.next()?;
        if !non_empty(host) {
            return None;
        }
        return Some(GitUri {
            user: user.to_string(),
            repo: repo.to_string(),
            host: host.to_string(),
        });
    }

    None
}

/// Generates the dated directory name for a clone.
///
/// A custom name wins outright; otherwise the name is derived from the
/// parsed URI as `YYYY-MM-DD-user-repo`.
pub fn clone_directory_name(
    git_uri: &str,
    custom_name: Option<&str>,
    now: DateTime<Local>,
) -> Result<String> {
    if let Some(name) = custom_name {
        return Ok(name.to_string());
    }

    let parsed = parse_git_uri(git_uri).ok_or_else(|| Error::GitUri(git_uri.to_string()))?;
    Ok(format!("{}-{}-{}", date_prefix(now), parsed.user, parsed.repo))
}

/// Returns a directory name unique within `tries_path` by appending
/// `-2`, `-3`, ... as needed.
pub fn unique_dir_name(tries_path: &Path, dir_name: &str) -> String {
    let mut candidate = dir_name.to_string();
    let mut i = 2;

    while tries_path.join(&candidate).exists() {
        candidate = format!("{dir_name}-{i}");
        i += 1;
    }

    candidate
}

/// Resolves a unique slug for `{date_prefix}-{slug}` under `tries_path`.
///
/// A slug that already ends in a number is incremented (`build2` → `build3`)
/// instead of getting a second counter appended.
pub fn resolve_unique_name_with_versioning(
    tries_path: &Path,
    date_prefix: &str,
    slug: &str,
) -> String {
    if !tries_path.join(format!("{date_prefix}-{slug}")).exists() {
        return slug.to_string();
    }

    let stem = slug.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() < slug.len() {
        if let Ok(n) = slug[stem.len()..].parse::<u64>() {
            let mut candidate_num = n + 1;
            loop {
                let candidate = format!("{stem}{candidate_num}");
                if !tries_path.join(format!("{date_prefix}-{candidate}")).exists() {
                    return candidate;
                }
                candidate_num += 1;
            }
        }
    }

    let full = unique_dir_name(tries_path, &format!("{date_prefix}-{slug}"));
    full.replacen(&format!("{date_prefix}-"), "", 1)
}

/// Generates the full path for a new worktree of `repo_dir`.
pub fn worktree_path(
    tries_path: &Path,
    repo_dir: &Path,
    custom_name: Option<&str>,
    now: DateTime<Local>,
) -> std::path::PathBuf {
    let slug = match custom_name {
        Some(name) if !name.trim().is_empty() => slugify(name),
        _ => {
            let resolved = repo_dir.canonicalize().unwrap_or_else(|_| repo_dir.to_path_buf());
            resolved
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "worktree".to_string())
        }
    };

    let prefix = date_prefix(now);
    let slug = resolve_unique_name_with_versioning(tries_path, &prefix, &slug);
    tries_path.join(format!("{prefix}-{slug}"))
}
