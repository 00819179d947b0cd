use crate::areas::project::Project;
use std::path::Path;

impl Project {
    pub fn ls_tree(&self, dir: &Path) -> anyhow::Result<()> {
        let snapshot = self.workspace(dir).capture()?;

        for (path, entry) in snapshot.entries() {
            writeln!(
                self.writer(),
                "{} {} {}",
                entry.content_id(),
                entry.content().kind().as_str(),
                path.display()
            )?;
        }
        writeln!(self.writer(), "tree {}", snapshot.tree_id())?;

        Ok(())
    }
}
