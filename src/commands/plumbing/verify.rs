use crate::areas::project::Project;
use crate::artifacts::patch::{FileOp, PatchSet};
use colored::Colorize;
use std::path::Path;

impl Project {
    /// Decode every document of a patch store and print what it would change
    pub fn verify(&self, dir: &Path) -> anyhow::Result<PatchSet> {
        let patch_set = self.patch_store(dir).load()?;

        for patch in patch_set.iter() {
            let (added, removed) = patch.line_stats();
            let path = match &patch.op {
                FileOp::Rename(to) => format!("{} => {}", patch.path.display(), to.display()),
                _ => patch.path.display().to_string(),
            };

            writeln!(
                self.writer(),
                "{}\t{}\t{} hunk(s)\t{}\t{}",
                patch.op.status_char(),
                path,
                patch.hunks.len(),
                format!("+{added}").green(),
                format!("-{removed}").red()
            )?;
        }
        writeln!(self.writer(), "{} file patch(es) OK", patch_set.len())?;

        Ok(patch_set)
    }
}
