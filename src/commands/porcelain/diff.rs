use crate::areas::project::Project;
use crate::artifacts::diff::DiffConfig;
use crate::artifacts::diff::tree_diff::ChangeFilter;
use crate::artifacts::patch::{FileOp, PatchSet, codec};
use crate::engine;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub base: PathBuf,
    pub variant: PathBuf,
    /// Patch directory to (re)write; the patch set is printed when absent
    pub output: Option<PathBuf>,
    pub config: DiffConfig,
    pub filter: Option<ChangeFilter>,
}

impl Project {
    pub fn diff(&self, opts: &DiffOptions) -> anyhow::Result<PatchSet> {
        let base = self.workspace(&opts.base).capture()?;
        let variant = self.workspace(&opts.variant).capture()?;

        let mut patch_set = engine::diff(&base, &variant, &opts.config);
        if let Some(filter) = opts.filter {
            patch_set = patch_set.filtered(filter);
        }

        match &opts.output {
            Some(dir) => {
                let written = self.patch_store(dir).save(&patch_set)?;
                tracing::info!(
                    files = patch_set.len(),
                    documents = written.len(),
                    dir = %dir.display(),
                    "wrote patch documents"
                );
                self.print_name_status(&patch_set)?;
            }
            None => self.print_patch_set(&patch_set)?,
        }

        Ok(patch_set)
    }

    fn print_name_status(&self, patch_set: &PatchSet) -> anyhow::Result<()> {
        for patch in patch_set.iter() {
            match &patch.op {
                FileOp::Rename(to) => writeln!(
                    self.writer(),
                    "{}\t{}\t{}",
                    patch.op.status_char(),
                    patch.path.display(),
                    to.display()
                )?,
                op => writeln!(self.writer(), "{}\t{}", op.status_char(), patch.path.display())?,
            }
        }

        Ok(())
    }

    fn print_patch_set(&self, patch_set: &PatchSet) -> anyhow::Result<()> {
        let text = codec::encode(patch_set);

        for line in text.split_inclusive('\n') {
            let line = line.strip_suffix('\n').unwrap_or(line);
            writeln!(self.writer(), "{}", Self::colorize_patch_line(line))?;
        }

        Ok(())
    }

    fn colorize_patch_line(line: &str) -> ColoredString {
        if line.starts_with("=== ") {
            line.bold()
        } else if line.starts_with("@@") {
            line.cyan()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else {
            line.normal()
        }
    }
}
