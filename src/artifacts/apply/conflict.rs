use derive_new::new;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub hint: &'static str,
}

impl From<&ConflictReason> for ConflictMessage {
    fn from(value: &ConflictReason) -> Self {
        match value {
            ConflictReason::NotFound => Self {
                header: "The following patched files are missing from the base tree:",
                hint: "Restore the files or drop their patches.",
            },
            ConflictReason::AlreadyExists => Self {
                header: "The following files would be overwritten by an add or rename:",
                hint: "Move the existing files away or regenerate the patches.",
            },
            ConflictReason::ContextNotFound => Self {
                header: "The following hunks could not be located in the base tree:",
                hint: "Regenerate the patches against the current base, or retry with more fuzz.",
            },
            ConflictReason::Overlap => Self {
                header: "The following hunks overlap a hunk applied before them:",
                hint: "Split or merge the overlapping hunks.",
            },
            ConflictReason::AmbiguousMatch => Self {
                header: "The following hunks match equally well at more than one place:",
                hint: "Widen the hunk context so it matches one location only.",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    NotFound,
    AlreadyExists,
    ContextNotFound,
    Overlap,
    AmbiguousMatch,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::NotFound => "not found",
            ConflictReason::AlreadyExists => "already exists",
            ConflictReason::ContextNotFound => "context not found",
            ConflictReason::Overlap => "overlap",
            ConflictReason::AmbiguousMatch => "ambiguous match",
        }
    }
}

/// A per-file or per-hunk failure to apply cleanly
///
/// `hunk` is the 0-based index within the file patch and is `None` for
/// file-level conflicts. `line` is the 1-based line of the file being patched where
/// the hunk was expected (or found, for an overlap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, new)]
pub struct Conflict {
    pub path: PathBuf,
    pub hunk: Option<usize>,
    pub reason: ConflictReason,
    pub fuzz: usize,
    pub line: Option<usize>,
}

impl Conflict {
    pub fn file(path: impl Into<PathBuf>, reason: ConflictReason) -> Self {
        Self::new(path.into(), None, reason, 0, None)
    }

    pub fn hunk(path: impl Into<PathBuf>, hunk: usize, reason: ConflictReason, fuzz: usize, line: usize) -> Self {
        Self::new(path.into(), Some(hunk), reason, fuzz, Some(line))
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.hunk, self.line) {
            (Some(hunk), Some(line)) => write!(
                f,
                "{}: hunk #{} {} at line {} (fuzz {})",
                self.path.display(),
                hunk + 1,
                self.reason.as_str(),
                line,
                self.fuzz
            ),
            _ => write!(f, "{}: {}", self.path.display(), self.reason.as_str()),
        }
    }
}
