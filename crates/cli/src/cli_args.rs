//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure for the `try`
//! binary using the `clap` crate. Besides the user-facing options it carries
//! a set of hidden flags used by the scripted test harness to drive the
//! picker deterministically.

use clap::Parser;

/// Command-line arguments for the `try` binary.
///
/// The trailing words select the mode: `init`, `clone`, `worktree` and `exec`
/// are subcommand-like, a git URI triggers a clone, a leading `.`/`./path`
/// creates a workspace from the current directory, and anything else seeds
/// the interactive selector's query.
#[derive(Parser, Debug)]
#[command(name = "try", version, term_width = 0)]
pub struct Args {
    /// Override the tries directory.
    ///
    /// If not provided, `TRY_PATH` is consulted, then `~/src/tries`.
    #[arg(long)]
    pub path: Option<String>,

    /// Disable ANSI colors in all output.
    #[arg(long, action)]
    pub no_colors: bool,

    /// Emit style tokens literally instead of expanding them to ANSI.
    #[arg(long, hide = true, action)]
    pub no_expand_tokens: bool,

    /// Pre-fill the selector's query buffer.
    #[arg(long, hide = true)]
    pub and_type: Option<String>,

    /// Render a single frame and exit without reading input.
    #[arg(long, hide = true, action)]
    pub and_exit: bool,

    /// Scripted key sequence, e.g. `DOWN,DOWN,ENTER` or `TYPE=demo,ENTER`.
    #[arg(long, hide = true)]
    pub and_keys: Option<String>,

    /// Out-of-band answer for the delete confirmation prompt.
    #[arg(long, hide = true)]
    pub and_confirm: Option<String>,

    /// Subcommand word and/or search query.
    #[arg(trailing_var_arg = true)]
    pub words: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["try"]);

        assert!(args.path.is_none());
        assert!(!args.no_colors);
        assert!(!args.no_expand_tokens);
        assert!(args.and_type.is_none());
        assert!(!args.and_exit);
        assert!(args.and_keys.is_none());
        assert!(args.and_confirm.is_none());
        assert!(args.words.is_empty());
    }

    #[test]
    fn test_args_path_and_colors() {
        let args = Args::parse_from(["try", "--path", "/tmp/tries", "--no-colors"]);

        assert_eq!(args.path, Some("/tmp/tries".to_string()));
        assert!(args.no_colors);
    }

    #[test]
    fn test_args_hidden_test_flags() {
        let args = Args::parse_from([
            "try",
            "--and-type",
            "demo",
            "--and-exit",
            "--and-keys",
            "DOWN,ENTER",
            "--and-confirm",
            "YES",
        ]);

        assert_eq!(args.and_type, Some("demo".to_string()));
        assert!(args.and_exit);
        assert_eq!(args.and_keys, Some("DOWN,ENTER".to_string()));
        assert_eq!(args.and_confirm, Some("YES".to_string()));
    }

    #[test]
    fn test_args_query_words() {
        let args = Args::parse_from(["try", "my", "project"]);
        assert_eq!(args.words, vec!["my".to_string(), "project".to_string()]);
    }

    #[test]
    fn test_args_subcommand_word_stays_positional() {
        let args = Args::parse_from(["try", "clone", "https://github.com/a/b", "name"]);
        assert_eq!(args.words[0], "clone");
        assert_eq!(args.words.len(), 3);
    }
}
