use crate::artifacts::script::patch_script::{SCRIPT_EXTENSION, script_target};
use crate::artifacts::script::{PatchScript, ScriptSet};
use anyhow::Context;
use std::path::Path;
use walkdir::WalkDir;

/// A directory of directive scripts laid out like the tree they patch
#[derive(Debug)]
pub struct ScriptStore {
    path: Box<Path>,
}

impl ScriptStore {
    pub fn new(path: Box<Path>) -> Self {
        ScriptStore { path }
    }

    pub fn load(&self) -> anyhow::Result<ScriptSet> {
        if !self.path.is_dir() {
            anyhow::bail!("The specified script directory does not exist: {:?}", self.path);
        }

        let mut scripts = ScriptSet::new();
        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", self.path))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(self.path.as_ref()) else {
                continue;
            };
            let Some(target) = script_target(relative) else {
                tracing::debug!(path = %relative.display(), "skipping non-{SCRIPT_EXTENSION} file");
                continue;
            };

            let text = std::fs::read_to_string(entry.path())
                .with_context(|| format!("Failed to read script: {:?}", entry.path()))?;
            let script = PatchScript::parse(&relative.to_string_lossy(), &text)?;
            scripts
                .insert(target, script)
                .map_err(|script| anyhow::anyhow!("duplicate script {}", script.source_name()))?;
        }

        Ok(scripts)
    }
}
