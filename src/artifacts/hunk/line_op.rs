use derive_new::new;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineOp {
    Add,
    Remove,
    Context,
}

impl LineOp {
    pub fn prefix(&self) -> char {
        match self {
            LineOp::Add => '+',
            LineOp::Remove => '-',
            LineOp::Context => ' ',
        }
    }

    pub fn try_from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '+' => Some(LineOp::Add),
            '-' => Some(LineOp::Remove),
            ' ' => Some(LineOp::Context),
            _ => None,
        }
    }

    /// Whether the line exists in the source (pre-patch) file
    pub fn in_source(&self) -> bool {
        !matches!(self, LineOp::Add)
    }

    /// Whether the line exists in the target (post-patch) file
    pub fn in_target(&self) -> bool {
        !matches!(self, LineOp::Remove)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct HunkLine {
    pub op: LineOp,
    pub line: String,
}

impl HunkLine {
    pub fn add(line: impl Into<String>) -> Self {
        Self::new(LineOp::Add, line.into())
    }

    pub fn remove(line: impl Into<String>) -> Self {
        Self::new(LineOp::Remove, line.into())
    }

    pub fn context(line: impl Into<String>) -> Self {
        Self::new(LineOp::Context, line.into())
    }
}

impl Display for HunkLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.op.prefix(), self.line.trim_end_matches('\n'))
    }
}
