use crate::areas::patch_store::PatchStore;
use crate::areas::script_store::ScriptStore;
use crate::areas::workspace::Workspace;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Command context: the directory relative paths resolve against, and where output goes
pub struct Project {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
}

impl Project {
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve project directory: {:?}", path))?;

        Ok(Project {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.path.join(path)
    }

    pub fn workspace(&self, path: &Path) -> Workspace {
        Workspace::new(self.resolve(path).into_boxed_path())
    }

    pub fn patch_store(&self, path: &Path) -> PatchStore {
        PatchStore::new(self.resolve(path).into_boxed_path())
    }

    pub fn script_store(&self, path: &Path) -> ScriptStore {
        ScriptStore::new(self.resolve(path).into_boxed_path())
    }
}
