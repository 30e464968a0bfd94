//! Tryspace Core Library
//!
//! This crate provides the non-interactive core of tryspace, an ephemeral
//! workspace manager built around date-prefixed "try" directories. It covers
//! candidate loading and fuzzy ranking, directory-name generation, git URI
//! parsing, style-token expansion and the shell scripts the `try` binary
//! emits for its parent shell to eval.
//!
//! # Key Features
//!
//! - **Fuzzy Ranking**: subsequence matching with word-boundary, proximity,
//!   density, length and recency factors
//! - **Candidate Loading**: one-shot scan of the tries directory with
//!   per-entry fault tolerance
//! - **Name Generation**: dated directory names for new tries, clones and
//!   worktrees, with collision versioning
//! - **Script Emission**: cd/mkdir/clone/worktree/delete scripts plus the
//!   `try init` shell function
//! - **Error Handling**: comprehensive error types for all failure modes
//!
//! # Examples
//!
//! Ranking candidates against a query:
//!
//! ```no_run
//! use std::path::Path;
//! use tryspace_core::tries::{load_try_dirs, rank_try_dirs};
//!
//! let all = load_try_dirs(Path::new("/home/user/src/tries"));
//! let ranked = rank_try_dirs(&all, "proj", chrono::Local::now());
//! for try_dir in &ranked {
//!     println!("{} ({:.1})", try_dir.base_name, try_dir.score);
//! }
//! ```

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod naming;
pub mod script;
pub mod style;
pub mod tries;
