//! Directive scripts: the JSON patch flavour
//!
//! A script is a list of entries, each pairing an action (`insert`, `set`,
//! `replace`, ...) with line selectors. Scripts address lines by number or by
//! searching the file, so they survive drift that would break a hunk.
//!
//! - `line_range`: inclusive line ranges and offsets
//! - `selector`: the ways an entry picks lines
//! - `loaded_lines`: the editable file buffer with deferred insertions
//! - `action`: what an entry does to the picked lines
//! - `patch_script`: parsing scripts and applying a set of them to a tree

pub mod action;
pub mod line_range;
pub mod loaded_lines;
pub mod patch_script;
pub mod selector;

pub use patch_script::{PatchScript, ScriptSet, apply_scripts};
