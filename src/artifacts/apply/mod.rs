//! Reconstructing a variant tree from a base tree and a patch set
//!
//! - `fuzz_config`: how far and how loosely hunks may be relocated
//! - `conflict`: per-file and per-hunk failures, collected rather than raised
//! - `placement`: the bounded search that relocates a hunk in a drifted file
//! - `applier`: the per-file driver producing an `ApplyResult`

pub mod applier;
pub mod conflict;
pub mod fuzz_config;
pub mod placement;

pub use applier::{ApplyResult, apply_patch_set};
pub use conflict::{Conflict, ConflictReason};
pub use fuzz_config::FuzzConfig;
