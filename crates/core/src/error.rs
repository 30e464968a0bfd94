use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Terminal error: {}", _0)]
    Terminal(#[from] std::io::Error),

    #[error("IO error with {} at `{}`: {}", .what, .path.display(), .original)]
    Io {
        what: String,
        path: PathBuf,
        original: std::io::Error,
    },

    #[error("Error: try requires an interactive terminal")]
    NotATerminal,

    #[error("Safety check failed: {} is not inside {}", .target.display(), .base.display())]
    OutsideBasePath { target: PathBuf, base: PathBuf },

    #[error("Unable to parse git URI: {}", _0)]
    GitUri(String),
}

impl Error {
    pub fn io_error(what: &str, path: impl Into<PathBuf>, original: std::io::Error) -> Self {
        Self::Io {
            what: what.to_string(),
            path: path.into(),
            original,
        }
    }

    pub fn outside_base_path(target: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self::OutsideBasePath {
            target: target.into(),
            base: base.into(),
        }
    }
}
