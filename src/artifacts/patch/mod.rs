//! Patch sets and their textual form
//!
//! - `file_patch`: the per-file delta (`FileOp` plus ordered hunks)
//! - `patch_set`: one variant's full delta against the base, keyed by path
//! - `codec`: the stable, reviewable patch document format

pub mod codec;
pub mod file_patch;
pub mod patch_set;

pub use file_patch::{FileOp, FilePatch};
pub use patch_set::PatchSet;
