//! Engine data structures and algorithms
//!
//! - `snapshot`: immutable file trees and content ids
//! - `hunk`: the atomic unit of change
//! - `diff`: Myers' diff, hunk grouping and tree comparison with renames
//! - `patch`: file patches, patch sets and the patch document codec
//! - `apply`: fuzzy hunk placement and conflict collection
//! - `report`: conflict aggregation for build tooling and humans
//! - `script`: JSON directive scripts
//! - `core`: shared utilities (pager wrapper)
//! - `errors`: the engine's error type

pub mod apply;
pub mod core;
pub mod diff;
pub mod errors;
pub mod hunk;
pub mod patch;
pub mod report;
pub mod script;
pub mod snapshot;
