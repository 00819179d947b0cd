use crate::artifacts::apply::conflict::{Conflict, ConflictMessage, ConflictReason};
use crate::artifacts::patch::{FilePatch, PatchSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileConflicts {
    pub path: PathBuf,
    pub conflicts: Vec<Conflict>,
}

/// Conflicts grouped by path, each group ordered by hunk index
///
/// File-level conflicts (no hunk index) sort before hunk conflicts of the
/// same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    clean: bool,
    conflict_count: usize,
    files: Vec<FileConflicts>,
}

impl ConflictReport {
    pub fn new(conflicts: &[Conflict]) -> Self {
        let mut grouped: BTreeMap<PathBuf, Vec<Conflict>> = BTreeMap::new();
        for conflict in conflicts {
            grouped
                .entry(conflict.path.clone())
                .or_default()
                .push(conflict.clone());
        }

        let files = grouped
            .into_iter()
            .map(|(path, mut conflicts)| {
                conflicts.sort_by_key(|conflict| conflict.hunk);
                FileConflicts { path, conflicts }
            })
            .collect();

        ConflictReport {
            clean: conflicts.is_empty(),
            conflict_count: conflicts.len(),
            files,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn conflict_count(&self) -> usize {
        self.conflict_count
    }

    pub fn files(&self) -> &[FileConflicts] {
        &self.files
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.files.iter().flat_map(|file| &file.conflicts)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary, one line per conflict
    pub fn summary(&self) -> String {
        let mut out = String::new();

        if self.clean {
            out.push_str("Applied cleanly, no conflicts.\n");
            return out;
        }

        let _ = writeln!(
            out,
            "{} conflict(s) in {} file(s):",
            self.conflict_count,
            self.files.len()
        );
        for file in &self.files {
            let _ = writeln!(out, "  {}", file.path.display());
            for conflict in &file.conflicts {
                let _ = match (conflict.hunk, conflict.line) {
                    (Some(hunk), Some(line)) => writeln!(
                        out,
                        "    hunk #{}: {} at line {} (fuzz {})",
                        hunk + 1,
                        conflict.reason.as_str(),
                        line,
                        conflict.fuzz
                    ),
                    _ => writeln!(out, "    {}", conflict.reason.as_str()),
                };
            }
        }

        let reasons = self
            .conflicts()
            .map(|conflict| conflict.reason)
            .collect::<BTreeSet<ConflictReason>>();
        out.push('\n');
        for reason in &reasons {
            let ConflictMessage { header, hint } = reason.into();
            let _ = writeln!(out, "{header}\n  {hint}");
        }

        out
    }

    /// The parts of `patch_set` that did not apply
    ///
    /// Hunk conflicts keep only the rejected hunks of their file patch;
    /// file-level conflicts keep the whole file patch.
    pub fn rejects(&self, patch_set: &PatchSet) -> PatchSet {
        let mut rejected = PatchSet::new();

        for file in &self.files {
            let Some(patch) = find_patch(patch_set, &file.path) else {
                continue;
            };

            let reject = if file.conflicts.iter().any(|c| c.hunk.is_none()) {
                patch.clone()
            } else {
                let hunks = file
                    .conflicts
                    .iter()
                    .filter_map(|c| c.hunk)
                    .filter_map(|index| patch.hunks.get(index).cloned())
                    .collect();
                FilePatch::new(patch.path.clone(), patch.op.clone(), patch.encoding, hunks)
            };

            // a rename conflict names the target, so two entries may map to one patch
            let _ = rejected.insert(reject);
        }

        rejected
    }
}

fn find_patch<'p>(patch_set: &'p PatchSet, path: &Path) -> Option<&'p FilePatch> {
    patch_set
        .get(path)
        .or_else(|| patch_set.iter().find(|patch| patch.target_path() == path))
}
