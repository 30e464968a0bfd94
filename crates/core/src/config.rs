//! Base-directory resolution for tryspace.
//!
//! The tries directory is where every dated workspace lives. It can be set
//! with the `--path` flag, the `TRY_PATH` environment variable, or falls back
//! to the default. Shell expansions like `~` are resolved.

use std::env;

/// Default directory holding all try workspaces
pub const DEFAULT_TRIES_PATH: &str = "~/src/tries";

/// Environment variable overriding the tries directory
pub const TRIES_PATH_VAR: &str = "TRY_PATH";

/// Resolves the tries directory path.
///
/// Precedence: explicit argument, then `TRY_PATH`, then the default.
/// The result is tilde-expanded.
///
/// # Examples
///
/// ```
/// use tryspace_core::config::get_tries_path;
///
/// let custom = get_tries_path(&Some("/tmp/tries".to_string()));
/// assert_eq!(custom, "/tmp/tries");
/// ```
pub fn get_tries_path(path_arg: &Option<String>) -> String {
    let tries_path = match path_arg {
        Some(path) => path.clone(),
        None => env::var(TRIES_PATH_VAR).unwrap_or_else(|_| DEFAULT_TRIES_PATH.to_string()),
    };

    shellexpand::tilde(&tries_path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tries_path_with_custom_path() {
        let result = get_tries_path(&Some("/custom/tries".to_string()));
        assert_eq!(result, "/custom/tries");
    }

    #[test]
    fn test_get_tries_path_expands_tilde() {
        let result = get_tries_path(&Some("~/my-tries".to_string()));
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("my-tries"));
    }

    #[test]
    fn test_get_tries_path_default_is_expanded() {
        // The default may be shadowed by TRY_PATH in the environment; either
        // way the result must not contain an unexpanded tilde.
        let result = get_tries_path(&None);
        assert!(!result.starts_with('~'));
    }
}
