//! Outcome types for the picker.

use std::path::PathBuf;

use tryspace_core::tries::DeleteTarget;

/// Terminal outcome of a picker session.
///
/// Each variant feeds a distinct downstream script: cd, mkdir+cd, or rm.
/// Cancellation is a first-class outcome so callers handle it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An existing try directory was chosen
    Selected(PathBuf),
    /// The synthetic "create new" row was chosen; the path does not exist yet
    CreateNew(PathBuf),
    /// A confirmed, containment-validated batch deletion
    DeleteConfirmed {
        targets: Vec<DeleteTarget>,
        base_path: PathBuf,
    },
    /// The user backed out; nothing was selected
    Cancelled,
}
