//! Command implementations
//!
//! - `porcelain`: the user-facing commands (diff, apply, script)
//! - `plumbing`: inspection commands for trees and patch stores (ls-tree, verify)
//!
//! Commands are methods on [`Project`](crate::areas::project::Project) and
//! write their human-readable output through its writer.

pub mod plumbing;
pub mod porcelain;
