use crate::artifacts::patch::codec;
use crate::artifacts::patch::{FilePatch, PatchSet};
use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PATCH_EXTENSION: &str = "patch";
pub const REJECT_EXTENSION: &str = "rej";

/// A directory of patch documents, one `<path>.patch` per file patch
///
/// Immediate subdirectories double as variants when a store holds several
/// independent patch sets.
#[derive(Debug, Clone)]
pub struct PatchStore {
    path: Box<Path>,
}

impl PatchStore {
    pub fn new(path: Box<Path>) -> Self {
        PatchStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn documents(&self, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
        if !self.path.is_dir() {
            anyhow::bail!("The specified patch directory does not exist: {:?}", self.path);
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", self.path))?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == extension)
            {
                documents.push(entry.into_path());
            }
        }

        Ok(documents)
    }

    /// Decode every patch document into one patch set
    pub fn load(&self) -> anyhow::Result<PatchSet> {
        let mut patch_set = PatchSet::new();

        for document in self.documents(PATCH_EXTENSION)? {
            let name = document
                .strip_prefix(self.path.as_ref())
                .unwrap_or(&document)
                .to_string_lossy()
                .into_owned();
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("Failed to read patch document: {:?}", document))?;

            let decoded = codec::decode_named(&name, &text)?;
            patch_set.merge(decoded).map_err(|duplicate| {
                anyhow::anyhow!(
                    "{} is patched by more than one document (second one: {})",
                    duplicate.path.display(),
                    name
                )
            })?;
        }

        tracing::debug!(path = %self.path.display(), files = patch_set.len(), "loaded patch set");
        Ok(patch_set)
    }

    /// Replace the stored documents with those of `patch_set`
    pub fn save(&self, patch_set: &PatchSet) -> anyhow::Result<Vec<PathBuf>> {
        patch_set.validate()?;
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("Failed to create patch directory: {:?}", self.path))?;
        for stale in self.documents(PATCH_EXTENSION)? {
            std::fs::remove_file(&stale)
                .with_context(|| format!("Failed to remove stale patch: {:?}", stale))?;
        }

        self.write_documents(patch_set, PATCH_EXTENSION)
    }

    /// Replace earlier `.rej` documents with the rejected hunks of this run
    ///
    /// An empty `rejects` only clears the residue.
    pub fn save_rejects(&self, rejects: &PatchSet) -> anyhow::Result<Vec<PathBuf>> {
        if self.path.is_dir() {
            for stale in self.documents(REJECT_EXTENSION)? {
                std::fs::remove_file(&stale)
                    .with_context(|| format!("Failed to remove stale reject: {:?}", stale))?;
            }
        }

        self.write_documents(rejects, REJECT_EXTENSION)
    }

    fn write_documents(&self, patch_set: &PatchSet, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(patch_set.len());

        for patch in patch_set.iter() {
            let document = self.path.join(Self::document_name(patch, extension));
            if let Some(parent) = document.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }

            let mut text = String::new();
            codec::encode_file_patch(patch, &mut text);
            std::fs::write(&document, text)
                .with_context(|| format!("Failed to write patch document: {:?}", document))?;
            written.push(document);
        }

        Ok(written)
    }

    fn document_name(patch: &FilePatch, extension: &str) -> PathBuf {
        let mut name = OsString::from(patch.path.as_os_str());
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    /// Names of the immediate subdirectories, in sorted order
    pub fn variants(&self) -> anyhow::Result<Vec<String>> {
        let mut variants = std::fs::read_dir(&self.path)
            .with_context(|| format!("Failed to read patch directory: {:?}", self.path))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        variants.sort();

        Ok(variants)
    }

    pub fn variant(&self, name: &str) -> PatchStore {
        PatchStore::new(self.path.join(name).into_boxed_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::hunk::{Hunk, HunkLine};
    use crate::artifacts::patch::FileOp;
    use crate::artifacts::snapshot::file_content::ContentKind;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn patch_set() -> PatchSet {
        PatchSet::from_iter([
            FilePatch::new(
                PathBuf::from("src/a.txt"),
                FileOp::Modify,
                ContentKind::Text,
                vec![Hunk {
                    source_start: 1,
                    source_length: 1,
                    target_start: 1,
                    target_length: 1,
                    context_before: vec![],
                    context_after: vec![],
                    changed_lines: vec![HunkLine::remove("a\n"), HunkLine::add("b\n")],
                }],
            ),
            FilePatch::new(PathBuf::from("gone.txt"), FileOp::Delete, ContentKind::Text, vec![]),
        ])
    }

    #[test]
    fn saves_one_document_per_file_and_loads_them_back() {
        let dir = TempDir::new().unwrap();
        dir.child("stale.txt.patch").write_str("=== delete stale.txt\n").unwrap();
        let store = PatchStore::new(dir.path().into());

        store.save(&patch_set()).unwrap();

        dir.child("stale.txt.patch").assert(predicates::path::missing());
        dir.child("src/a.txt.patch")
            .assert("=== modify src/a.txt\n@@ -1,1 +1,1 @@\n-a\n+b\n");
        assert_eq!(store.load().unwrap(), patch_set());
    }

    #[test]
    fn saving_rejects_clears_earlier_residue() {
        let dir = TempDir::new().unwrap();
        dir.child("old.txt.rej").write_str("=== delete old.txt\n").unwrap();
        dir.child("keep.txt.patch").write_str("=== delete keep.txt\n").unwrap();
        let store = PatchStore::new(dir.path().into());

        store.save_rejects(&PatchSet::new()).unwrap();
        dir.child("old.txt.rej").assert(predicates::path::missing());
        dir.child("keep.txt.patch").assert(predicates::path::exists());

        store.save_rejects(&patch_set()).unwrap();
        dir.child("src/a.txt.rej").assert(predicates::path::exists());
        dir.child("gone.txt.rej").assert(predicates::path::exists());
    }

    #[test]
    fn rejects_into_a_missing_directory_are_a_no_op_when_empty() {
        let dir = TempDir::new().unwrap();
        let store = PatchStore::new(dir.path().join("rejects").into());

        assert!(store.save_rejects(&PatchSet::new()).unwrap().is_empty());
        dir.child("rejects").assert(predicates::path::missing());
    }

    #[test]
    fn malformed_documents_name_themselves() {
        let dir = TempDir::new().unwrap();
        dir.child("broken.patch").write_str("@@ -1,1 +1,1 @@\n").unwrap();

        let error = PatchStore::new(dir.path().into()).load().unwrap_err();

        assert!(error.to_string().contains("malformed patch broken.patch at line 1"));
    }

    #[test]
    fn lists_variants_in_order() {
        let dir = TempDir::new().unwrap();
        dir.child("v2/a.patch").write_str("").unwrap();
        dir.child("v1/a.patch").write_str("").unwrap();
        dir.child("notes.md").write_str("").unwrap();

        assert_eq!(
            PatchStore::new(dir.path().into()).variants().unwrap(),
            vec!["v1".to_string(), "v2".to_string()]
        );
    }
}
