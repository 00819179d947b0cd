//! Conflict aggregation
//!
//! The report is a pure view over the conflicts of one apply pass. It renders
//! either a JSON document for build tooling or a plain-text summary, and can
//! carve the rejected hunks out of the patch set for `.rej` residue.

pub mod conflict_report;

pub use conflict_report::ConflictReport;
