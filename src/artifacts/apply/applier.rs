//! Patch application
//!
//! Files are processed in path order against a working copy of the base tree.
//! Within a file, hunks are placed one after another: each placement shifts
//! where the next hunk is expected, and a hunk may not land before the end of
//! the previous one. Conflicts are recorded and the pass continues.

use crate::artifacts::apply::conflict::{Conflict, ConflictReason};
use crate::artifacts::apply::fuzz_config::FuzzConfig;
use crate::artifacts::apply::placement::{self, Miss, Placement};
use crate::artifacts::errors::{PatchError, PatchResult};
use crate::artifacts::patch::{FileOp, FilePatch, PatchSet};
use crate::artifacts::snapshot::file_content::FileContent;
use crate::artifacts::snapshot::tree_snapshot::FileTreeSnapshot;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub resulting_tree: FileTreeSnapshot,
    pub conflicts: Vec<Conflict>,
}

impl ApplyResult {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Apply every file patch of `patch_set` to `base`
///
/// Fails only when the patch set is structurally invalid; everything else is
/// reported through [`ApplyResult::conflicts`].
pub fn apply_patch_set(base: &FileTreeSnapshot, patch_set: &PatchSet, config: &FuzzConfig) -> PatchResult<ApplyResult> {
    patch_set.validate()?;

    let mut applier = Applier::new(base, *config);
    for patch in patch_set.iter() {
        applier.apply_file_patch(patch)?;
    }

    let result = applier.finish();
    tracing::debug!(
        base = %base.tree_id().to_short_id(),
        result = %result.resulting_tree.tree_id().to_short_id(),
        conflicts = result.conflicts.len(),
        "applied patch set"
    );
    Ok(result)
}

struct Applier {
    config: FuzzConfig,
    files: BTreeMap<PathBuf, FileContent>,
    conflicts: Vec<Conflict>,
}

impl Applier {
    fn new(base: &FileTreeSnapshot, config: FuzzConfig) -> Self {
        Applier {
            config,
            files: base.to_files(),
            conflicts: Vec::new(),
        }
    }

    fn finish(self) -> ApplyResult {
        ApplyResult {
            resulting_tree: FileTreeSnapshot::new(self.files),
            conflicts: self.conflicts,
        }
    }

    fn record(&mut self, conflict: Conflict) {
        tracing::warn!(%conflict, "conflict");
        self.conflicts.push(conflict);
    }

    fn apply_file_patch(&mut self, patch: &FilePatch) -> PatchResult<()> {
        match &patch.op {
            FileOp::Add => {
                if self.files.contains_key(&patch.path) {
                    self.record(Conflict::file(&patch.path, ConflictReason::AlreadyExists));
                    return Ok(());
                }

                let lines = patch
                    .hunks
                    .iter()
                    .flat_map(|hunk| hunk.core_target().cloned())
                    .collect();
                let content = rebuild(patch, lines)?;
                self.files.insert(patch.path.clone(), content);
            }
            FileOp::Delete => {
                let Some(content) = self.files.remove(&patch.path) else {
                    self.record(Conflict::file(&patch.path, ConflictReason::NotFound));
                    return Ok(());
                };

                let actual = content.view_as(patch.encoding);
                let expected = patch.hunks.iter().flat_map(|hunk| hunk.core_source());
                if !actual.iter().eq(expected) {
                    tracing::warn!(
                        path = %patch.path.display(),
                        "deleting a file whose content differs from the patch"
                    );
                }
            }
            FileOp::Modify => {
                let Some(content) = self.files.remove(&patch.path) else {
                    self.record(Conflict::file(&patch.path, ConflictReason::NotFound));
                    return Ok(());
                };

                let patched = self.patch_content(patch, content)?;
                self.files.insert(patch.path.clone(), patched);
            }
            FileOp::Rename(to) => {
                if !self.files.contains_key(&patch.path) {
                    self.record(Conflict::file(&patch.path, ConflictReason::NotFound));
                    return Ok(());
                }
                if *to != patch.path && self.files.contains_key(to) {
                    self.record(Conflict::file(to, ConflictReason::AlreadyExists));
                    return Ok(());
                }

                let Some(content) = self.files.remove(&patch.path) else {
                    return Ok(());
                };
                let patched = self.patch_content(patch, content)?;
                self.files.insert(to.clone(), patched);
            }
        }

        Ok(())
    }

    fn patch_content(&mut self, patch: &FilePatch, content: FileContent) -> PatchResult<FileContent> {
        if patch.hunks.is_empty() {
            return Ok(content);
        }

        let lines = content.view_as(patch.encoding).into_owned();
        let lines = self.apply_hunks(patch, lines);
        rebuild(patch, lines)
    }

    fn apply_hunks(&mut self, patch: &FilePatch, mut lines: Vec<String>) -> Vec<String> {
        let radius = self.config.radius_for(lines.len());
        let max_fuzz = self.config.max_fuzz();
        // Shift between source coordinates and the working buffer
        let mut delta: isize = 0;
        // End of the last applied core; later hunks may not start before it
        let mut floor = 0;

        for (index, hunk) in patch.hunks.iter().enumerate() {
            let expected = hunk
                .expected_core_offset()
                .saturating_add_signed(delta)
                .min(lines.len());

            match placement::locate(&lines, hunk, expected, max_fuzz, radius) {
                Err(Miss { reason, fuzz }) => {
                    self.record(Conflict::hunk(&patch.path, index, reason, fuzz, expected + 1));
                }
                Ok(Placement { at, fuzz }) if at < floor => {
                    self.record(Conflict::hunk(&patch.path, index, ConflictReason::Overlap, fuzz, at + 1));
                }
                Ok(Placement { at, fuzz }) => {
                    let core_len = hunk.core_source_len();
                    let replacement = hunk.core_target().cloned().collect::<Vec<_>>();
                    let written = replacement.len();
                    lines.splice(at..at + core_len, replacement);

                    tracing::debug!(
                        path = %patch.path.display(),
                        hunk = index,
                        line = at + 1,
                        offset = at as isize - expected as isize,
                        fuzz,
                        "applied hunk"
                    );

                    delta = (at + written) as isize - (hunk.expected_core_offset() + core_len) as isize;
                    floor = at + written;
                }
            }
        }

        lines
    }
}

// Binary rows are decoded back to bytes, which may turn out to be text again
fn rebuild(patch: &FilePatch, lines: Vec<String>) -> PatchResult<FileContent> {
    let content = FileContent::from_line_view(lines, patch.encoding).map_err(|e| {
        PatchError::invalid(&patch.path, 0, format!("binary rows do not decode: {e}"))
    })?;

    Ok(match content {
        FileContent::Binary(data) => FileContent::from_bytes(data),
        text => text,
    })
}
