use crate::areas::project::Project;
use crate::artifacts::report::ConflictReport;
use crate::commands::porcelain::apply::{ReportFormat, VariantOutcome};
use crate::engine;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ScriptOptions {
    pub base: PathBuf,
    pub scripts: PathBuf,
    pub output: PathBuf,
    pub report: ReportFormat,
}

impl Project {
    /// Run directive scripts against the base tree; returns the number of conflicts
    pub fn script(&self, opts: &ScriptOptions) -> anyhow::Result<usize> {
        let base = self.workspace(&opts.base).capture()?;
        let scripts = self.script_store(&opts.scripts).load()?;

        let result = engine::apply_scripts(&base, &scripts)?;
        self.workspace(&opts.output).materialize(&result.resulting_tree)?;

        let report = ConflictReport::new(&result.conflicts);
        tracing::info!(
            scripts = scripts.len(),
            conflicts = report.conflict_count(),
            "applied scripts"
        );

        let conflicts = report.conflict_count();
        self.print_reports(&[VariantOutcome { name: None, report }], opts.report)?;
        Ok(conflicts)
    }
}
