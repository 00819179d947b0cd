use crate::artifacts::diff::tree_diff::ChangeFilter;
use crate::artifacts::hunk::Hunk;
use crate::artifacts::patch::codec::{BINARY_MARKER, RENAME_SEPARATOR};
use crate::artifacts::snapshot::file_content::ContentKind;
use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileOp {
    Modify,
    Add,
    Delete,
    Rename(PathBuf),
}

impl FileOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            FileOp::Modify => "modify",
            FileOp::Add => "add",
            FileOp::Delete => "delete",
            FileOp::Rename(_) => "rename",
        }
    }

    pub fn status_char(&self) -> char {
        match self {
            FileOp::Modify => 'M',
            FileOp::Add => 'A',
            FileOp::Delete => 'D',
            FileOp::Rename(_) => 'R',
        }
    }

    pub fn matches_filter(&self, filter: ChangeFilter) -> bool {
        match self {
            FileOp::Modify => filter.contains(ChangeFilter::MODIFIED),
            FileOp::Add => filter.contains(ChangeFilter::ADDED),
            FileOp::Delete => filter.contains(ChangeFilter::DELETED),
            FileOp::Rename(_) => filter.contains(ChangeFilter::RENAMED),
        }
    }
}

/// The delta for one file of the tree
///
/// `path` is the file's path in the base tree, except for `Add`, where it is
/// the new path. Hunks are ordered by `source_start` and never overlap in
/// source coordinates.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FilePatch {
    pub path: PathBuf,
    pub op: FileOp,
    pub encoding: ContentKind,
    pub hunks: Vec<Hunk>,
}

impl FilePatch {
    /// Path the file has once the patch is applied
    pub fn target_path(&self) -> &Path {
        match &self.op {
            FileOp::Rename(to) => to,
            _ => &self.path,
        }
    }

    /// `(added, removed)` line counts across all hunks
    pub fn line_stats(&self) -> (usize, usize) {
        self.hunks
            .iter()
            .flat_map(|hunk| &hunk.changed_lines)
            .fold((0, 0), |(added, removed), line| {
                match (line.op.in_source(), line.op.in_target()) {
                    (false, true) => (added + 1, removed),
                    (true, false) => (added, removed + 1),
                    _ => (added, removed),
                }
            })
    }

    /// Check the structural invariants, naming the first offending hunk
    ///
    /// Paths the document header cannot carry are reported against hunk 0.
    pub fn validate(&self) -> Result<(), (usize, String)> {
        self.check_header_paths().map_err(|reason| (0, reason))?;

        for (index, hunk) in self.hunks.iter().enumerate() {
            hunk.check_consistency().map_err(|reason| (index, reason))?;

            match self.op {
                FileOp::Add if hunk.source_length != 0 => {
                    return Err((index, "an added file cannot remove lines".to_string()));
                }
                FileOp::Delete if hunk.target_length != 0 => {
                    return Err((index, "a deleted file cannot add lines".to_string()));
                }
                _ => {}
            }

            if self.encoding == ContentKind::Binary
                && hunk
                    .lines()
                    .any(|line| hex::decode(line.line.trim_end()).is_err())
            {
                return Err((index, "binary hunk carries a non-hex row".to_string()));
            }
        }

        for (index, pair) in self.hunks.windows(2).enumerate() {
            if pair[1].source_offset() < pair[0].source_end() {
                return Err((
                    index + 1,
                    format!("hunk overlaps or precedes hunk {index} in source order"),
                ));
            }
        }

        Ok(())
    }

    // a header is one line; renames split on the first separator, text paths must not look binary
    fn check_header_paths(&self) -> Result<(), String> {
        let mut paths = vec![self.path.as_path()];
        if let FileOp::Rename(to) = &self.op {
            paths.push(to);
        }

        for path in paths {
            let text = path.to_string_lossy();
            if text.is_empty() {
                return Err("file path is empty".to_string());
            }
            if text.contains(['\n', '\r']) {
                return Err(format!("file path {text:?} contains a line break"));
            }
            if matches!(self.op, FileOp::Rename(_)) && text.contains(RENAME_SEPARATOR) {
                return Err(format!("renamed path {text:?} contains {RENAME_SEPARATOR:?}"));
            }
        }

        if self.encoding == ContentKind::Text && self.path.to_string_lossy().starts_with(BINARY_MARKER) {
            return Err(format!(
                "text file path {:?} starts with {BINARY_MARKER:?}",
                self.path.display()
            ));
        }

        Ok(())
    }
}
