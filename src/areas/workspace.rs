use crate::artifacts::snapshot::file_content::FileContent;
use crate::artifacts::snapshot::tree_snapshot::FileTreeSnapshot;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_DIRS: [&str; 3] = [".git", ".svn", ".hg"];
const REJECT_EXTENSION: &str = "rej";

/// A directory on disk that trees are captured from and materialized into
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative paths of every tracked file, in sorted order
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        if !self.path.is_dir() {
            anyhow::bail!("The specified path is not a directory: {:?}", self.path);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored_dir(entry.path()))
        {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", self.path))?;
            if !entry.file_type().is_file() || Self::is_reject(entry.path()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(self.path.as_ref()) {
                files.push(relative.to_path_buf());
            }
        }

        Ok(files)
    }

    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| IGNORED_DIRS.contains(&name.to_string_lossy().as_ref()))
    }

    fn is_reject(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == REJECT_EXTENSION)
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let data = std::fs::read(self.path.join(file_path))
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(Bytes::from(data))
    }

    /// Snapshot every tracked file
    pub fn capture(&self) -> anyhow::Result<FileTreeSnapshot> {
        let files = self
            .list_files()?
            .into_iter()
            .map(|path| {
                let content = FileContent::from_bytes(self.read_file(&path)?);
                Ok((path, content))
            })
            .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

        let snapshot = FileTreeSnapshot::new(files);
        tracing::debug!(
            path = %self.path.display(),
            files = snapshot.len(),
            tree = %snapshot.tree_id().to_short_id(),
            "captured tree"
        );
        Ok(snapshot)
    }

    /// Make the directory hold exactly `snapshot`
    ///
    /// Files absent from the snapshot are removed, and directories left empty
    /// are pruned. Ignored directories and reject files are left alone.
    pub fn materialize(&self, snapshot: &FileTreeSnapshot) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("Failed to create directory: {:?}", self.path))?;

        for (path, _) in snapshot.entries() {
            if !Self::is_contained(path) {
                anyhow::bail!("Refusing to write outside of {:?}: {:?}", self.path, path);
            }
        }

        let stale = self
            .list_files()?
            .into_iter()
            .filter(|path| !snapshot.contains(path))
            .collect::<BTreeSet<_>>();
        for file_path in &stale {
            std::fs::remove_file(self.path.join(file_path))
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        for (file_path, entry) in snapshot.entries() {
            self.write_file(file_path, &entry.content().to_bytes())?;
        }

        self.prune_empty_dirs()?;
        tracing::debug!(
            path = %self.path.display(),
            files = snapshot.len(),
            removed = stale.len(),
            "materialized tree"
        );

        Ok(())
    }

    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        if path.is_dir() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove existing directory: {:?}", file_path))?;
        }

        std::fs::write(&path, data).with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    // children before parents, so nested empty directories collapse in one pass
    fn prune_empty_dirs(&self) -> anyhow::Result<()> {
        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored_dir(entry.path()))
        {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", self.path))?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let is_empty = std::fs::read_dir(entry.path())
                .with_context(|| format!("Failed to read directory: {:?}", entry.path()))?
                .next()
                .is_none();
            if is_empty {
                std::fs::remove_dir(entry.path())
                    .with_context(|| format!("Failed to remove directory: {:?}", entry.path()))?;
            }
        }

        Ok(())
    }

    fn is_contained(path: &Path) -> bool {
        path.components().all(|component| matches!(component, Component::Normal(_)))
    }
}
