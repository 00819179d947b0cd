//! Tree-level comparison of two snapshots
//!
//! Paths are classified in sorted order as added, deleted or modified; files
//! whose content ids match are skipped. Deleted/added pairs that share enough
//! lines are then coalesced into renames. Finally every change is turned into
//! a [`FilePatch`] carrying its hunks.

use crate::artifacts::diff::diff_config::DiffConfig;
use crate::artifacts::diff::hunk_builder::build_hunks;
use crate::artifacts::diff::myers::{DiffAlgorithm, MyersDiff};
use crate::artifacts::diff::similarity::{similarity, similarity_bound};
use crate::artifacts::hunk::{Hunk, HunkLine};
use crate::artifacts::patch::{FileOp, FilePatch, PatchSet};
use crate::artifacts::snapshot::file_content::ContentKind;
use crate::artifacts::snapshot::tree_snapshot::{FileEntry, FileTreeSnapshot};
use bitflags::bitflags;
use std::collections::BTreeMap;
use std::path::PathBuf;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ChangeFilter: u32 {
        const ADDED = 0b0001;
        const DELETED = 0b0010;
        const MODIFIED = 0b0100;
        const RENAMED = 0b1000;
    }
}

impl ChangeFilter {
    pub fn try_parse(s: &str) -> Option<Self> {
        let mut filter = Self::empty();

        for c in s.chars() {
            match c {
                'A' => filter |= Self::ADDED,
                'D' => filter |= Self::DELETED,
                'M' => filter |= Self::MODIFIED,
                'R' => filter |= Self::RENAMED,
                _ => return None,
            }
        }

        Some(filter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeChange<'s> {
    Added(&'s FileEntry),
    Deleted(&'s FileEntry),
    Modified {
        old: &'s FileEntry,
        new: &'s FileEntry,
    },
    Renamed {
        to: PathBuf,
        old: &'s FileEntry,
        new: &'s FileEntry,
    },
}

impl<'s> TreeChange<'s> {
    pub fn from_entries(old: Option<&'s FileEntry>, new: Option<&'s FileEntry>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChange::Added(new)),
            (Some(old), None) => Some(TreeChange::Deleted(old)),
            (Some(old), Some(new)) if old.content_id() != new.content_id() => {
                Some(TreeChange::Modified { old, new })
            }
            _ => None,
        }
    }
}

pub type ChangeSet<'s> = BTreeMap<PathBuf, TreeChange<'s>>;

#[derive(Debug)]
pub struct TreeDiff<'s> {
    base: &'s FileTreeSnapshot,
    variant: &'s FileTreeSnapshot,
    config: DiffConfig,
    change_set: ChangeSet<'s>,
}

impl<'s> TreeDiff<'s> {
    pub fn new(base: &'s FileTreeSnapshot, variant: &'s FileTreeSnapshot, config: DiffConfig) -> Self {
        TreeDiff {
            base,
            variant,
            config,
            change_set: BTreeMap::new(),
        }
    }

    pub fn changes(&self) -> &ChangeSet<'s> {
        &self.change_set
    }

    /// Classify every path of both trees and coalesce renames
    pub fn compare(mut self) -> Self {
        self.detect_deletions_and_modifications();
        self.detect_additions();
        if self.config.detect_renames {
            self.detect_renames();
        }
        self
    }

    pub fn into_patch_set(self) -> PatchSet {
        let context = self.config.context_lines;

        self.change_set
            .into_iter()
            .map(|(path, change)| file_patch_for(path, change, context))
            .collect()
    }

    fn detect_deletions_and_modifications(&mut self) {
        for (path, entry) in self.base.entries() {
            if let Some(change) = TreeChange::from_entries(Some(entry), self.variant.get(path)) {
                self.change_set.insert(path.to_path_buf(), change);
            }
        }
    }

    fn detect_additions(&mut self) {
        for (path, entry) in self.variant.entries() {
            if self.base.contains(path) {
                continue;
            }
            self.change_set
                .insert(path.to_path_buf(), TreeChange::Added(entry));
        }
    }

    fn detect_renames(&mut self) {
        let deleted = self
            .change_set
            .iter()
            .filter_map(|(path, change)| match change {
                TreeChange::Deleted(entry) => Some((path.clone(), *entry)),
                _ => None,
            })
            .collect::<Vec<_>>();
        let mut added = self
            .change_set
            .iter()
            .filter_map(|(path, change)| match change {
                TreeChange::Added(entry) => Some((path.clone(), *entry)),
                _ => None,
            })
            .collect::<Vec<_>>();

        for (old_path, old) in deleted {
            let Some(best) = self.best_rename_candidate(old, &added) else {
                continue;
            };
            let (new_path, new) = added.remove(best);

            tracing::debug!(
                from = %old_path.display(),
                to = %new_path.display(),
                "detected rename"
            );
            self.change_set.remove(&new_path);
            self.change_set.insert(
                old_path,
                TreeChange::Renamed {
                    to: new_path,
                    old,
                    new,
                },
            );
        }
    }

    // Highest similarity at or above the threshold; earlier (smaller) paths win ties
    fn best_rename_candidate(&self, old: &FileEntry, added: &[(PathBuf, &FileEntry)]) -> Option<usize> {
        let old_kind = old.content().kind();
        let old_lines = old.content().line_view();
        let mut best: Option<(usize, f64)> = None;

        for (i, (_, new)) in added.iter().enumerate() {
            if new.content().kind() != old_kind {
                continue;
            }

            let score = if new.content_id() == old.content_id() {
                1.0
            } else {
                let new_lines = new.content().line_view();
                let bound = similarity_bound(old_lines.len(), new_lines.len());
                if bound < self.config.rename_threshold
                    || best.is_some_and(|(_, best_score)| bound <= best_score)
                {
                    continue;
                }
                similarity(&old_lines, &new_lines)
            };

            if score >= self.config.rename_threshold
                && best.is_none_or(|(_, best_score)| score > best_score)
            {
                best = Some((i, score));
            }
        }

        best.map(|(i, _)| i)
    }
}

fn file_patch_for(path: PathBuf, change: TreeChange<'_>, context: usize) -> FilePatch {
    match change {
        TreeChange::Added(entry) => {
            let lines = entry.content().line_view();
            let hunks = whole_file_hunk(&lines, true).into_iter().collect();
            FilePatch::new(path, FileOp::Add, entry.content().kind(), hunks)
        }
        TreeChange::Deleted(entry) => {
            let lines = entry.content().line_view();
            let hunks = whole_file_hunk(&lines, false).into_iter().collect();
            FilePatch::new(path, FileOp::Delete, entry.content().kind(), hunks)
        }
        TreeChange::Modified { old, new } => {
            let (encoding, hunks) = content_hunks(old, new, context);
            FilePatch::new(path, FileOp::Modify, encoding, hunks)
        }
        TreeChange::Renamed { to, old, new } => {
            let (encoding, hunks) = content_hunks(old, new, context);
            FilePatch::new(path, FileOp::Rename(to), encoding, hunks)
        }
    }
}

// A text/binary mismatch is diffed through the byte-level hex view of both sides
fn content_hunks(old: &FileEntry, new: &FileEntry, context: usize) -> (ContentKind, Vec<Hunk>) {
    let encoding = match (old.content().kind(), new.content().kind()) {
        (ContentKind::Text, ContentKind::Text) => ContentKind::Text,
        _ => ContentKind::Binary,
    };
    let a = old.content().view_as(encoding);
    let b = new.content().view_as(encoding);

    let edits = MyersDiff::new(a.as_ref(), b.as_ref()).diff();
    (encoding, build_hunks(&a, &b, &edits, context))
}

fn whole_file_hunk(lines: &[String], added: bool) -> Option<Hunk> {
    if lines.is_empty() {
        return None;
    }

    let (source_length, target_length) = if added { (0, lines.len()) } else { (lines.len(), 0) };
    let changed_lines = lines
        .iter()
        .map(|line| {
            if added {
                HunkLine::add(line.clone())
            } else {
                HunkLine::remove(line.clone())
            }
        })
        .collect();

    Some(Hunk {
        source_start: if added { 0 } else { 1 },
        source_length,
        target_start: if added { 1 } else { 0 },
        target_length,
        context_before: Vec::new(),
        context_after: Vec::new(),
        changed_lines,
    })
}

/// Diff two snapshots into a patch set
pub fn diff_trees(base: &FileTreeSnapshot, variant: &FileTreeSnapshot, config: &DiffConfig) -> PatchSet {
    let patch_set = TreeDiff::new(base, variant, *config).compare().into_patch_set();

    tracing::debug!(
        base = %base.tree_id().to_short_id(),
        variant = %variant.tree_id().to_short_id(),
        files = patch_set.len(),
        "diffed trees"
    );
    patch_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::snapshot::file_content::FileContent;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::path::Path;

    fn text_tree(files: &[(&str, &str)]) -> FileTreeSnapshot {
        files
            .iter()
            .map(|(path, text)| (*path, FileContent::from_text(text)))
            .collect()
    }

    fn numbered_text(count: usize) -> String {
        (1..=count).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn identical_trees_produce_an_empty_patch_set() {
        let tree = text_tree(&[("a.txt", "a\n"), ("dir/b.txt", "b\n")]);

        assert!(diff_trees(&tree, &tree, &DiffConfig::default()).is_empty());
    }

    #[test]
    fn classifies_added_deleted_and_modified_paths() {
        let base = text_tree(&[("keep.txt", "same\n"), ("gone.txt", "x\n"), ("edit.txt", "a\nb\n")]);
        let variant = text_tree(&[("keep.txt", "same\n"), ("edit.txt", "a\nB\n"), ("new.txt", "fresh\n")]);

        let patch_set = diff_trees(&base, &variant, &DiffConfig::default());
        let ops = patch_set
            .iter()
            .map(|p| (p.path.to_string_lossy().to_string(), p.op.status_char()))
            .collect::<Vec<_>>();

        assert_eq!(
            ops,
            vec![
                ("edit.txt".to_string(), 'M'),
                ("gone.txt".to_string(), 'D'),
                ("new.txt".to_string(), 'A'),
            ]
        );
    }

    #[test]
    fn single_line_replacement_yields_one_framed_hunk() {
        let base = text_tree(&[("f.txt", "a\nb\nc\n")]);
        let variant = text_tree(&[("f.txt", "a\nX\nc\n")]);

        let patch_set = diff_trees(&base, &variant, &DiffConfig::default());
        let patch = patch_set.get(Path::new("f.txt")).unwrap();

        assert_eq!(patch.hunks.len(), 1);
        assert_eq!(patch.hunks[0].context_before, vec!["a\n".to_string()]);
        assert_eq!(patch.hunks[0].context_after, vec!["c\n".to_string()]);
        assert_eq!(
            patch.hunks[0].changed_lines,
            vec![HunkLine::remove("b\n"), HunkLine::add("X\n")]
        );
    }

    #[test]
    fn similar_moved_file_becomes_a_rename_with_residual_hunk() {
        let original = numbered_text(20);
        let moved = original
            .replace("line 10\n", "line ten\n")
            .replace("line 11\n", "line eleven\n");
        let base = text_tree(&[("foo.txt", original.as_str())]);
        let variant = text_tree(&[("bar.txt", moved.as_str())]);

        let patch_set = diff_trees(&base, &variant, &DiffConfig::default());

        assert_eq!(patch_set.len(), 1);
        let patch = patch_set.get(Path::new("foo.txt")).unwrap();
        assert_eq!(patch.op, FileOp::Rename(PathBuf::from("bar.txt")));
        assert_eq!(patch.hunks.len(), 1);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn dissimilar_or_disabled_renames_stay_add_delete(#[case] similar_content: bool) {
        let base = text_tree(&[("foo.txt", numbered_text(10).as_str())]);
        let new_text = if similar_content { numbered_text(10) } else { "other\n".repeat(10) };
        let variant = text_tree(&[("bar.txt", new_text.as_str())]);
        let config = DiffConfig::new(3, !similar_content, 0.5);

        let patch_set = diff_trees(&base, &variant, &config);

        let ops = patch_set.iter().map(|p| p.op.status_char()).collect::<String>();
        assert_eq!(ops, "AD");
    }

    #[test]
    fn rename_prefers_the_most_similar_candidate() {
        let original = numbered_text(10);
        let close = original.replace("line 5\n", "line five\n");
        let far = original
            .replace("line 1\n", "one\n")
            .replace("line 2\n", "two\n")
            .replace("line 3\n", "three\n");
        let base = text_tree(&[("src.txt", original.as_str())]);
        let variant = text_tree(&[("a_far.txt", far.as_str()), ("b_close.txt", close.as_str())]);

        let patch_set = diff_trees(&base, &variant, &DiffConfig::default());

        let rename = patch_set.get(Path::new("src.txt")).unwrap();
        assert_eq!(rename.op, FileOp::Rename(PathBuf::from("b_close.txt")));
        assert_eq!(patch_set.get(Path::new("a_far.txt")).unwrap().op, FileOp::Add);
    }

    #[test]
    fn change_filter_parses_status_letters() {
        assert_eq!(
            ChangeFilter::try_parse("AR"),
            Some(ChangeFilter::ADDED | ChangeFilter::RENAMED)
        );
        assert_eq!(ChangeFilter::try_parse("AX"), None);
    }
}
