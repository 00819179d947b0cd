//! Porcelain commands
//!
//! - `diff`: regenerate a variant's patch documents from its edited tree
//! - `apply`: rebuild variant trees from the base tree and their patches
//! - `script`: rebuild a tree by running JSON directive scripts

pub mod apply;
pub mod diff;
pub mod script;
