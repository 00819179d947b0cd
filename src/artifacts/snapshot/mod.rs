//! File-tree snapshots
//!
//! - `content_id`: SHA-1 identifiers for file contents and whole trees
//! - `file_content`: text/binary file content and its line view
//! - `tree_snapshot`: the immutable path → content mapping the engine reads

pub mod content_id;
pub mod file_content;
pub mod tree_snapshot;
