//! On-disk collaborators of the engine
//!
//! - `workspace`: capturing a directory as a snapshot and writing one back
//! - `patch_store`: patch documents (and `.rej` residue) on disk, per variant
//! - `script_store`: directive scripts on disk
//! - `project`: the command context tying paths and output together

pub mod patch_store;
pub mod project;
pub mod script_store;
pub mod workspace;
