use crate::artifacts::diff::tree_diff::ChangeFilter;
use crate::artifacts::errors::{PatchError, PatchResult};
use crate::artifacts::patch::file_patch::FilePatch;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A variant's complete delta against its base tree
///
/// Keyed by [`FilePatch::path`], so iteration is in sorted path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    patches: BTreeMap<PathBuf, FilePatch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file patch; a second patch for the same path is handed back
    pub fn insert(&mut self, patch: FilePatch) -> Result<(), FilePatch> {
        if self.patches.contains_key(&patch.path) {
            return Err(patch);
        }
        self.patches.insert(patch.path.clone(), patch);
        Ok(())
    }

    /// Merge another set in, rejecting paths both sets patch
    pub fn merge(&mut self, other: PatchSet) -> Result<(), FilePatch> {
        for (_, patch) in other.patches {
            self.insert(patch)?;
        }
        Ok(())
    }

    pub fn get(&self, path: &Path) -> Option<&FilePatch> {
        self.patches.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilePatch> {
        self.patches.values()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn filtered(&self, filter: ChangeFilter) -> PatchSet {
        PatchSet {
            patches: self
                .patches
                .iter()
                .filter(|(_, patch)| patch.op.matches_filter(filter))
                .map(|(path, patch)| (path.clone(), patch.clone()))
                .collect(),
        }
    }

    /// Validate every file patch, failing on the first inconsistency
    pub fn validate(&self) -> PatchResult<()> {
        for patch in self.patches.values() {
            patch
                .validate()
                .map_err(|(hunk, reason)| PatchError::invalid(&patch.path, hunk, reason))?;
        }
        Ok(())
    }
}

impl IntoIterator for PatchSet {
    type Item = FilePatch;
    type IntoIter = std::collections::btree_map::IntoValues<PathBuf, FilePatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.into_values()
    }
}

impl FromIterator<FilePatch> for PatchSet {
    /// Later patches for an already-present path replace earlier ones
    fn from_iter<T: IntoIterator<Item = FilePatch>>(iter: T) -> Self {
        PatchSet {
            patches: iter
                .into_iter()
                .map(|patch| (patch.path.clone(), patch))
                .collect(),
        }
    }
}
