//! Engine error taxonomy
//!
//! Only structural problems are errors. Anything that goes wrong while placing
//! a hunk or touching a file is a [`Conflict`](crate::artifacts::apply::conflict::Conflict)
//! and is collected instead of raised.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A patch or script document could not be parsed.
    #[error("malformed patch {source_name} at line {line}: {reason}")]
    MalformedPatch {
        source_name: String,
        line: usize,
        reason: String,
    },
    /// A patch set was handed to the applier with hunks that contradict themselves.
    #[error("invalid patch set for {} (hunk {hunk}): {reason}", path.display())]
    InvalidPatchSet {
        path: PathBuf,
        hunk: usize,
        reason: String,
    },
}

impl PatchError {
    pub fn malformed(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        PatchError::MalformedPatch {
            source_name: source_name.to_string(),
            line,
            reason: reason.into(),
        }
    }

    pub fn invalid(path: impl Into<PathBuf>, hunk: usize, reason: impl Into<String>) -> Self {
        PatchError::InvalidPatchSet {
            path: path.into(),
            hunk,
            reason: reason.into(),
        }
    }
}

pub type PatchResult<T> = Result<T, PatchError>;
