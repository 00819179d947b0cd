//! Plumbing commands
//!
//! - `ls_tree`: list a captured tree with content ids
//! - `verify`: decode a patch store and print per-file statistics

pub mod ls_tree;
pub mod verify;
