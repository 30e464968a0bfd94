use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use crossterm::tty::IsTty;
use log::debug;

use tryspace_cli::cli_args::Args;
use tryspace_cli::picker::input::{parse_key_spec, KeySource, ScriptedKeys, TerminalKeys};
use tryspace_cli::picker::{Outcome, Picker, PickerOptions, Screen};
use tryspace_core::error::Result;
use tryspace_core::naming::{
    clone_directory_name, date_prefix, is_git_uri, resolve_unique_name_with_versioning, slugify,
    worktree_path,
};
use tryspace_core::{config, script};

fn emit(cmds: &[String]) -> Result<ExitCode> {
    let mut stdout = io::stdout();
    stdout.write_all(script::render_script(cmds).as_bytes())?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn usage_error(message: &str, usage: &str) -> ExitCode {
    eprintln!("Error: {message}");
    eprintln!("Usage: {usage}");
    ExitCode::FAILURE
}

fn absolutize(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn clone_script(tries_path: &Path, uri: &str, custom_name: Option<&str>) -> Result<ExitCode> {
    let dir_name = match clone_directory_name(uri, custom_name, Local::now()) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    emit(&script::script_clone(&tries_path.join(dir_name), uri))
}

fn cmd_clone(words: &[String], tries_path: &Path) -> Result<ExitCode> {
    let Some(uri) = words.first() else {
        return Ok(usage_error(
            "git URI required for clone command",
            "try clone <git-uri> [name]",
        ));
    };

    clone_script(tries_path, uri, words.get(1).map(String::as_str))
}

fn cmd_worktree(words: &[String], tries_path: &Path) -> Result<ExitCode> {
    let cwd = env::current_dir()?;

    let repo_dir = match words.first() {
        Some(repo) if repo != "dir" => absolutize(repo),
        _ => cwd.clone(),
    };

    let custom = words.get(1..).map(|rest| rest.join(" "));
    let custom = custom.as_deref().filter(|s| !s.trim().is_empty());

    let full_path = worktree_path(tries_path, &repo_dir, custom, Local::now());
    let source = if repo_dir == cwd { None } else { Some(repo_dir.as_path()) };
    emit(&script::script_worktree(&full_path, source))
}

/// Handles `try .` and `try ./path`: a workspace derived from an existing
/// directory, as a worktree when it is a git checkout.
fn cmd_from_path(words: &[String], tries_path: &Path) -> Result<ExitCode> {
    let path_arg = &words[0];
    let custom = words[1..].join(" ");

    if path_arg == "." && custom.trim().is_empty() {
        return Ok(usage_error(
            "'try .' requires a name argument",
            "try . <name>",
        ));
    }

    let repo_dir = absolutize(path_arg);
    let slug = if custom.trim().is_empty() {
        repo_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "workspace".to_string())
    } else {
        slugify(&custom)
    };

    let prefix = date_prefix(Local::now());
    let slug = resolve_unique_name_with_versioning(tries_path, &prefix, &slug);
    let full_path = tries_path.join(format!("{prefix}-{slug}"));

    if repo_dir.join(".git").is_dir() {
        emit(&script::script_worktree(&full_path, Some(&repo_dir)))
    } else {
        emit(&script::script_mkdir_cd(&full_path))
    }
}

/// Runs the interactive selector and emits a script for its outcome.
fn cmd_select(words: &[String], tries_path: &Path, args: &Args) -> Result<ExitCode> {
    if let Some(first) = words.first() {
        if first.starts_with('.') {
            return cmd_from_path(words, tries_path);
        }

        // Git URL shorthand: `try https://github.com/user/repo [name]`.
        if is_git_uri(first) {
            let custom = words[1..].join(" ");
            let custom = if custom.trim().is_empty() { None } else { Some(custom.as_str()) };
            return clone_script(tries_path, first, custom);
        }
    }

    let stderr = io::stderr();
    let is_tty = stderr.is_tty();
    let mut screen = Screen::new(stderr, is_tty);

    if args.no_expand_tokens {
        screen.disable_token_expansion();
    }
    if args.no_colors || env::var_os("NO_COLOR").is_some() {
        screen.disable_colors();
    }
    if args.and_exit || args.and_keys.is_some() {
        screen.force_colors();
    }

    let keys: Box<dyn KeySource> = match args.and_keys.as_deref() {
        Some(spec) if !spec.is_empty() => Box::new(ScriptedKeys::new(parse_key_spec(spec))),
        _ => Box::new(TerminalKeys),
    };

    let options = PickerOptions {
        search_term: words.join(" "),
        initial_input: args.and_type.clone(),
        render_once: args.and_exit,
        no_cls: args.and_exit,
        confirm: args.and_confirm.clone(),
    };

    let mut picker = Picker::new(tries_path, options, screen, keys);
    let outcome = picker.run()?;
    debug!("selector finished: {outcome:?}");

    match outcome {
        Outcome::Selected(path) => emit(&script::script_cd(&path)),
        Outcome::CreateNew(path) => emit(&script::script_mkdir_cd(&path)),
        Outcome::DeleteConfirmed { targets, base_path } => {
            emit(&script::script_delete(&targets, &base_path))
        }
        Outcome::Cancelled => {
            println!("Cancelled.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_init(words: &[String], resolved_path: &str) -> Result<ExitCode> {
    let init_path = match words.first() {
        Some(p) if p.starts_with('/') => config::get_tries_path(&Some(p.clone())),
        _ => resolved_path.to_string(),
    };

    let exe = env::current_exe().unwrap_or_else(|_| PathBuf::from("try"));
    println!("{}", script::init_script(&exe, &init_path, script::is_fish()));
    Ok(ExitCode::SUCCESS)
}

fn execute(args: &Args) -> Result<ExitCode> {
    let resolved_path = config::get_tries_path(&args.path);
    let tries_path = PathBuf::from(&resolved_path);
    debug!("tries path: `{}`", tries_path.display());

    let words = &args.words;

    match words.first().map(String::as_str) {
        Some("init") => cmd_init(&words[1..], &resolved_path),
        Some("clone") => cmd_clone(&words[1..], &tries_path),
        Some("worktree") => cmd_worktree(&words[1..], &tries_path),
        Some("exec") => match words.get(1).map(String::as_str) {
            Some("clone") => cmd_clone(&words[2..], &tries_path),
            Some("worktree") => cmd_worktree(&words[2..], &tries_path),
            Some("cd") => cmd_select(&words[2..], &tries_path, args),
            _ => cmd_select(&words[1..], &tries_path, args),
        },
        _ => cmd_select(words, &tries_path, args),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
