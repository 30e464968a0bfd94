//! Interactive fuzzy picker for try directories.
//!
//! Split into the raw input layer ([`input`]), the double-buffered diffing
//! renderer ([`screen`]), the selection state machine ([`selector`]) and the
//! terminal-independent result type ([`types`]).

pub mod input;
pub mod screen;
pub mod selector;
pub mod types;

pub use input::{parse_key_spec, KeySource, ScriptedKeys, TerminalKeys};
pub use screen::Screen;
pub use selector::{Picker, PickerOptions};
pub use types::Outcome;
