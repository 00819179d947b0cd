use crate::artifacts::apply::{ApplyResult, Conflict, ConflictReason};
use crate::artifacts::errors::{PatchError, PatchResult};
use crate::artifacts::script::action::ScriptEntry;
use crate::artifacts::script::loaded_lines::LoadedLines;
use crate::artifacts::snapshot::file_content::FileContent;
use crate::artifacts::snapshot::tree_snapshot::FileTreeSnapshot;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extension that marks a directive script; `Foo.java.json` patches `Foo.java`
pub const SCRIPT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct PatchScript {
    source_name: String,
    entries: Vec<ScriptEntry>,
}

impl PatchScript {
    pub fn parse(source_name: &str, text: &str) -> PatchResult<Self> {
        let entries = serde_json::from_str::<Vec<ScriptEntry>>(text)
            .map_err(|e| PatchError::malformed(source_name, e.line(), e.to_string()))?;

        Ok(PatchScript {
            source_name: source_name.to_string(),
            entries,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    /// Run every entry in order; returns how many edits were made
    pub fn apply_to(&self, file: &mut LoadedLines) -> usize {
        self.entries.iter().map(|entry| entry.apply(file)).sum()
    }
}

/// Path the script at `script_path` patches, if it is a script at all
pub fn script_target(script_path: &Path) -> Option<PathBuf> {
    (script_path.extension()? == SCRIPT_EXTENSION).then(|| script_path.with_extension(""))
}

/// Scripts keyed by the path of the file they patch
#[derive(Debug, Clone, Default)]
pub struct ScriptSet {
    scripts: BTreeMap<PathBuf, PatchScript>,
}

impl ScriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script for `target`; a second script for the same target is handed back
    pub fn insert(&mut self, target: PathBuf, script: PatchScript) -> Result<(), PatchScript> {
        if self.scripts.contains_key(&target) {
            return Err(script);
        }
        self.scripts.insert(target, script);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &PatchScript)> {
        self.scripts
            .iter()
            .map(|(path, script)| (path.as_path(), script))
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Run every script against its target file in `base`
///
/// A missing target is a `NotFound` conflict; a binary target cannot be
/// addressed by lines and is reported as `ContextNotFound`.
pub fn apply_scripts(base: &FileTreeSnapshot, scripts: &ScriptSet) -> PatchResult<ApplyResult> {
    let mut files = base.to_files();
    let mut conflicts = Vec::new();

    for (target, script) in scripts.iter() {
        let lines = match files.get(target) {
            None => {
                conflicts.push(Conflict::file(target, ConflictReason::NotFound));
                continue;
            }
            Some(FileContent::Binary(_)) => {
                conflicts.push(Conflict::file(target, ConflictReason::ContextNotFound));
                continue;
            }
            Some(FileContent::Text(lines)) => lines,
        };

        let mut loaded = LoadedLines::from_lines(lines);
        let edits = script.apply_to(&mut loaded);
        tracing::debug!(
            script = script.source_name(),
            path = %target.display(),
            edits,
            "applied script"
        );
        files.insert(target.to_path_buf(), FileContent::from_text(&loaded.render()));
    }

    for conflict in &conflicts {
        tracing::warn!(%conflict, "conflict");
    }

    Ok(ApplyResult {
        resulting_tree: FileTreeSnapshot::new(files),
        conflicts,
    })
}
