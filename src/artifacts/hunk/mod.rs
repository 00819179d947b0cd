//! Hunks: the atomic unit of change
//!
//! A hunk is a contiguous run of added, removed and context lines anchored at
//! a source/target offset, framed by the unchanged lines around it. The frame
//! is what lets the applier relocate a hunk when the base file has drifted.

pub mod model;
pub mod line_op;

pub use model::Hunk;
pub use line_op::{HunkLine, LineOp};
