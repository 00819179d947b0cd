//! Immutable capture of a file tree
//!
//! A snapshot maps relative paths to file content. Entries are kept in a
//! `BTreeMap`, so every walk over a snapshot is in sorted path order and does
//! not depend on how the tree was enumerated on disk.

use crate::artifacts::snapshot::content_id::ContentId;
use crate::artifacts::snapshot::file_content::FileContent;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A captured file; two entries are equal when their content ids are
#[derive(Debug, Clone)]
pub struct FileEntry {
    content: FileContent,
    content_id: ContentId,
}

impl FileEntry {
    pub fn new(content: FileContent) -> Self {
        let content_id = content.content_id();
        FileEntry {
            content,
            content_id,
        }
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }
}

impl PartialEq for FileEntry {
    fn eq(&self, other: &Self) -> bool {
        self.content_id == other.content_id
    }
}

impl Eq for FileEntry {}

#[derive(Debug, Clone)]
pub struct FileTreeSnapshot {
    entries: BTreeMap<PathBuf, FileEntry>,
    tree_id: ContentId,
}

impl FileTreeSnapshot {
    pub fn new(files: BTreeMap<PathBuf, FileContent>) -> Self {
        let entries = files
            .into_iter()
            .map(|(path, content)| (path, FileEntry::new(content)))
            .collect::<BTreeMap<_, _>>();
        let tree_id = ContentId::of_listing(
            entries
                .iter()
                .map(|(path, entry)| (path.as_path(), entry.content_id())),
        );

        FileTreeSnapshot { entries, tree_id }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn tree_id(&self) -> &ContentId {
        &self.tree_id
    }

    pub fn get(&self, path: &Path) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Path, &FileEntry)> {
        self.entries
            .iter()
            .map(|(path, entry)| (path.as_path(), entry))
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the contents out into a mutable map, leaving the snapshot untouched
    pub fn to_files(&self) -> BTreeMap<PathBuf, FileContent> {
        self.entries
            .iter()
            .map(|(path, entry)| (path.clone(), entry.content.clone()))
            .collect()
    }
}

impl Default for FileTreeSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for FileTreeSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FileTreeSnapshot {}

impl<P: Into<PathBuf>> FromIterator<(P, FileContent)> for FileTreeSnapshot {
    fn from_iter<T: IntoIterator<Item = (P, FileContent)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(path, content)| (path.into(), content))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn iterates_in_sorted_path_order() {
        let snapshot = FileTreeSnapshot::from_iter([
            ("z.txt", FileContent::from_text("z\n")),
            ("a/b.txt", FileContent::from_text("b\n")),
            ("a.txt", FileContent::from_text("a\n")),
        ]);

        let paths = snapshot
            .paths()
            .map(|p| p.to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["a/b.txt", "a.txt", "z.txt"]);
    }

    #[test]
    fn tree_id_tracks_content_not_insertion_order() {
        let first = FileTreeSnapshot::from_iter([
            ("a.txt", FileContent::from_text("a\n")),
            ("b.txt", FileContent::from_text("b\n")),
        ]);
        let second = FileTreeSnapshot::from_iter([
            ("b.txt", FileContent::from_text("b\n")),
            ("a.txt", FileContent::from_text("a\n")),
        ]);
        let changed = FileTreeSnapshot::from_iter([
            ("a.txt", FileContent::from_text("a\n")),
            ("b.txt", FileContent::from_text("B\n")),
        ]);

        assert_eq!(first.tree_id(), second.tree_id());
        assert_ne!(first.tree_id(), changed.tree_id());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_snapshot_has_stable_id() {
        assert_eq!(FileTreeSnapshot::empty().tree_id(), FileTreeSnapshot::default().tree_id());
        assert!(FileTreeSnapshot::empty().is_empty());
    }
}
