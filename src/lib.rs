//! Build-time source patching
//!
//! Derives variants of a source tree from one base tree plus stored patches,
//! and regenerates those patches when a variant is edited directly.
//!
//! - `engine`: the pure diff / encode / decode / apply surface
//! - `artifacts`: engine types and algorithms
//! - `areas`: on-disk trees, patch and script stores
//! - `commands`: the CLI commands built on top

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod engine;
