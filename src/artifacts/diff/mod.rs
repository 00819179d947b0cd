//! Diff algorithms and tree comparison
//!
//! - `myers`: Myers' diff for line-by-line comparison
//! - `hunk_builder`: grouping of an edit script into context-framed hunks
//! - `similarity`: line-overlap score used to pair renamed files
//! - `tree_diff`: tree-level diffing that classifies files and emits a `PatchSet`
//! - `diff_config`: context width and rename detection settings

pub mod diff_config;
pub mod hunk_builder;
pub mod myers;
pub mod similarity;
pub mod tree_diff;

pub use diff_config::DiffConfig;
pub use tree_diff::diff_trees;
