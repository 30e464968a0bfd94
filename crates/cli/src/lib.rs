//! tryspace CLI library.
//!
//! This crate provides the command-line interface for tryspace, an ephemeral
//! workspace manager. The `try` binary opens a fuzzy selector over dated
//! workspace directories and prints a shell script on stdout for the parent
//! shell to eval, so that selecting a workspace actually changes directory.
//!
//! # Architecture
//!
//! - [`cli_args`]: command-line argument parsing
//! - [`picker`]: the interactive selector (key input, diffing renderer,
//!   selection state machine)
//!
//! All interactive drawing goes to stderr; stdout is reserved for the
//! emitted script.
//!
//! # Examples
//!
//! ```bash
//! # Interactive selector
//! try
//!
//! # Selector with an initial query
//! try demo
//!
//! # Clone a repository into a dated workspace
//! try clone https://github.com/user/repo
//!
//! # Print the shell function to install
//! try init
//! ```

pub mod cli_args;
pub mod picker;
