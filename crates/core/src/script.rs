//! Shell script emission for parent-shell integration.
//!
//! The picker itself cannot change the invoking shell's directory, so every
//! action is emitted as a small script on stdout which the `try` shell
//! function evaluates. Stderr carries all interactive output.

use std::path::Path;

use crate::style;
use crate::tries::DeleteTarget;

/// First line of every emitted script; harmless when eval'd, a hint when not.
pub const SCRIPT_WARNING: &str =
    "# if you can read this, you didn't launch try from an alias. run try --help.";

/// Quotes `s` for POSIX shells.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}

fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}

/// Formats a command list for shell eval: warning line first, commands
/// chained with `&& \`.
pub fn render_script(cmds: &[String]) -> String {
    let mut out = String::from(SCRIPT_WARNING);
    out.push('\n');

    for (i, cmd) in cmds.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cmd);

        if i < cmds.len() - 1 {
            out.push_str(" && \\\n");
        } else {
            out.push('\n');
        }
    }

    out
}

/// Commands to touch and cd into an existing try.
///
/// The touch refreshes the directory mtime so the recency bonus keeps
/// recently-visited tries on top.
pub fn script_cd(path: &Path) -> Vec<String> {
    let quoted = quote_path(path);
    vec![format!("touch {quoted}"), format!("cd {quoted}")]
}

/// Commands to create a new try directory and cd into it.
pub fn script_mkdir_cd(path: &Path) -> Vec<String> {
    let mut cmds = vec![format!("mkdir -p {}", quote_path(path))];
    cmds.extend(script_cd(path));
    cmds
}

/// Commands to clone a git repository into a new try directory.
pub fn script_clone(path: &Path, uri: &str) -> Vec<String> {
    let msg = style::expand_tokens(&format!(
        "Using {{b}}git clone{{/b}} to create this trial from {uri}."
    ));

    let mut cmds = vec![
        format!("mkdir -p {}", quote_path(path)),
        format!("echo {}", shell_quote(&msg)),
        format!("git clone '{uri}' {}", quote_path(path)),
    ];
    cmds.extend(script_cd(path));
    cmds
}

/// Commands to create a detached git worktree in a new try directory.
///
/// `repo` is the source repository; when `None` the repository containing the
/// current working directory is used.
pub fn script_worktree(path: &Path, repo: Option<&Path>) -> Vec<String> {
    let quoted_path = quote_path(path);

    let (worktree_cmd, source) = match repo {
        Some(repo) => {
            let r = quote_path(repo);
            (
                format!(
                    "/usr/bin/env sh -c 'if git -C {r} rev-parse --is-inside-work-tree >/dev/null 2>&1; \
                     then repo=$(git -C {r} rev-parse --show-toplevel); \
                     git -C \"$repo\" worktree add --detach {quoted_path} >/dev/null 2>&1 || true; fi; exit 0'"
                ),
                repo.to_string_lossy().to_string(),
            )
        }
        None => {
            let cwd = std::env::current_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|_| ".".to_string());
            (
                format!(
                    "/usr/bin/env sh -c 'if git rev-parse --is-inside-work-tree >/dev/null 2>&1; \
                     then repo=$(git rev-parse --show-toplevel); \
                     git -C \"$repo\" worktree add --detach {quoted_path} >/dev/null 2>&1 || true; fi; exit 0'"
                ),
                cwd,
            )
        }
    };

    let msg = style::expand_tokens(&format!(
        "Using {{b}}git worktree{{/b}} to create this trial from {source}."
    ));

    let mut cmds = vec![
        format!("mkdir -p {quoted_path}"),
        format!("echo {}", shell_quote(&msg)),
        worktree_cmd,
    ];
    cmds.extend(script_cd(path));
    cmds
}

/// Commands to delete a confirmed batch of tries.
///
/// Deletion happens from inside the base directory using the validated
/// basenames, then the shell returns to where the user was.
pub fn script_delete(targets: &[DeleteTarget], base_path: &Path) -> Vec<String> {
    let mut cmds = vec![format!("cd {}", quote_path(base_path))];

    for target in targets {
        let quoted = shell_quote(&target.base_name);
        cmds.push(format!("[[ -d {quoted} ]] && rm -rf {quoted}"));
    }

    let cwd = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| ".".to_string());
    cmds.push(format!(
        "( cd {} 2>/dev/null || cd \"$HOME\" )",
        shell_quote(&cwd)
    ));

    cmds
}

/// Returns true if the user's login shell is fish.
pub fn is_fish() -> bool {
    std::env::var("SHELL").map(|s| s.contains("fish")).unwrap_or(false)
}

/// Generates the shell function installed by `try init`.
///
/// The function runs the binary with stderr on the tty (so the picker can
/// draw) and evals its stdout on success.
pub fn init_script(exe_path: &Path, tries_path: &str, fish: bool) -> String {
    let exe = quote_path(exe_path);
    let path_arg = if tries_path.is_empty() {
        String::new()
    } else {
        format!(" --path {}", shell_quote(tries_path))
    };

    if fish {
        format!(
            "function try\n  \
               set -l out ({exe} exec{path_arg} $argv 2>/dev/tty | string collect)\n  \
               if test $status -eq 0\n    \
                 eval $out\n  \
               else\n    \
                 echo $out\n  \
               end\n\
             end\n"
        )
    } else {
        format!(
            "try() {{\n  \
               local out\n  \
               out=$({exe} exec{path_arg} \"$@\" 2>/dev/tty)\n  \
               if [ $? -eq 0 ]; then\n    \
                 eval \"$out\"\n  \
               else\n    \
                 echo \"$out\"\n  \
               fi\n\
             }}\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn test_script_cd_touches_then_changes_dir() {
        let cmds = script_cd(Path::new("/tries/2024-01-01-foo"));
        assert_eq!(
            cmds,
            vec![
                "touch '/tries/2024-01-01-foo'".to_string(),
                "cd '/tries/2024-01-01-foo'".to_string(),
            ]
        );
    }

    #[test]
    fn test_script_mkdir_cd() {
        let cmds = script_mkdir_cd(Path::new("/tries/new"));
        assert_eq!(cmds[0], "mkdir -p '/tries/new'");
        assert_eq!(cmds.len(), 3);
    }

    #[test]
    fn test_render_script_joins_with_and() {
        let rendered = render_script(&["a".to_string(), "b".to_string()]);
        assert_eq!(rendered, format!("{SCRIPT_WARNING}\na && \\\n  b\n"));
    }

    #[test]
    fn test_script_delete_guards_each_target() {
        let targets = vec![
            DeleteTarget {
                path: PathBuf::from("/tries/2024-01-01-foo"),
                base_name: "2024-01-01-foo".to_string(),
            },
            DeleteTarget {
                path: PathBuf::from("/tries/2024-01-02-bar"),
                base_name: "2024-01-02-bar".to_string(),
            },
        ];

        let cmds = script_delete(&targets, Path::new("/tries"));
        assert_eq!(cmds[0], "cd '/tries'");
        assert_eq!(cmds[1], "[[ -d '2024-01-01-foo' ]] && rm -rf '2024-01-01-foo'");
        assert_eq!(cmds[2], "[[ -d '2024-01-02-bar' ]] && rm -rf '2024-01-02-bar'");
        assert_eq!(cmds.len(), 4);
    }

    #[test]
    fn test_init_script_bash_and_fish() {
        let bash = init_script(Path::new("/usr/bin/try"), "/tries", false);
        assert!(bash.starts_with("try() {"));
        assert!(bash.contains("exec --path '/tries'"));
        assert!(bash.contains("2>/dev/tty"));

        let fish = init_script(Path::new("/usr/bin/try"), "/tries", true);
        assert!(fish.starts_with("function try"));
        assert!(fish.contains("string collect"));
    }
}
