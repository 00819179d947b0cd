use crate::areas::patch_store::PatchStore;
use crate::areas::project::Project;
use crate::areas::workspace::Workspace;
use crate::artifacts::apply::FuzzConfig;
use crate::artifacts::report::ConflictReport;
use crate::artifacts::snapshot::tree_snapshot::FileTreeSnapshot;
use crate::engine;
use anyhow::Context;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub base: PathBuf,
    pub patches: PathBuf,
    pub output: PathBuf,
    pub fuzz: FuzzConfig,
    pub reject_dir: Option<PathBuf>,
    pub report: ReportFormat,
    /// Treat each subdirectory of `patches` as its own variant
    pub variants: bool,
}

/// Conflict report of one applied variant (`name` is `None` outside variant mode)
#[derive(Debug)]
pub struct VariantOutcome {
    pub name: Option<String>,
    pub report: ConflictReport,
}

struct VariantJob {
    name: Option<String>,
    patches: PatchStore,
    output: Workspace,
    rejects: Option<PatchStore>,
    fuzz: FuzzConfig,
}

impl VariantJob {
    fn run(self, base: &FileTreeSnapshot) -> anyhow::Result<VariantOutcome> {
        let patch_set = self.patches.load()?;
        let result = engine::apply(base, &patch_set, &self.fuzz)
            .with_context(|| format!("Failed to apply patches from {:?}", self.patches.path()))?;

        self.output.materialize(&result.resulting_tree)?;

        let report = ConflictReport::new(&result.conflicts);
        if let Some(store) = &self.rejects {
            store.save_rejects(&report.rejects(&patch_set))?;
        }

        tracing::info!(
            variant = self.name.as_deref().unwrap_or("-"),
            files = patch_set.len(),
            conflicts = report.conflict_count(),
            "applied patches"
        );
        Ok(VariantOutcome {
            name: self.name,
            report,
        })
    }
}

impl Project {
    /// Apply stored patches; returns the total number of conflicts
    pub async fn apply(&self, opts: &ApplyOptions) -> anyhow::Result<usize> {
        let outcomes = if opts.variants {
            self.apply_variants(opts).await?
        } else {
            let base = self.workspace(&opts.base).capture()?;
            let job = VariantJob {
                name: None,
                patches: self.patch_store(&opts.patches),
                output: self.workspace(&opts.output),
                rejects: opts.reject_dir.as_ref().map(|dir| self.patch_store(dir)),
                fuzz: opts.fuzz,
            };
            vec![job.run(&base)?]
        };

        self.print_reports(&outcomes, opts.report)?;
        Ok(outcomes
            .iter()
            .map(|outcome| outcome.report.conflict_count())
            .sum())
    }

    // one blocking task per variant; they share the captured base read-only
    async fn apply_variants(&self, opts: &ApplyOptions) -> anyhow::Result<Vec<VariantOutcome>> {
        let store = self.patch_store(&opts.patches);
        let names = store.variants()?;
        if names.is_empty() {
            anyhow::bail!("No variant directories found in {:?}", store.path());
        }

        let base = Arc::new(self.workspace(&opts.base).capture()?);
        let mut tasks = JoinSet::new();

        for name in names {
            let job = VariantJob {
                patches: store.variant(&name),
                output: self.workspace(&opts.output.join(&name)),
                rejects: opts
                    .reject_dir
                    .as_ref()
                    .map(|dir| self.patch_store(&dir.join(&name))),
                fuzz: opts.fuzz,
                name: Some(name),
            };
            let base = Arc::clone(&base);
            tasks.spawn_blocking(move || job.run(&base));
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined.context("Variant task failed to complete")??);
        }
        outcomes.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(outcomes)
    }

    pub(crate) fn print_reports(&self, outcomes: &[VariantOutcome], format: ReportFormat) -> anyhow::Result<()> {
        match format {
            ReportFormat::Text => {
                for outcome in outcomes {
                    if let Some(name) = &outcome.name {
                        writeln!(self.writer(), "{}", format!("variant {name}").bold())?;
                    }
                    self.print_summary(&outcome.report)?;
                }
            }
            ReportFormat::Json => {
                let json = match outcomes {
                    [single] if single.name.is_none() => single.report.to_json()?,
                    _ => {
                        let by_variant = outcomes
                            .iter()
                            .map(|outcome| {
                                let name = outcome.name.clone().unwrap_or_default();
                                serde_json::to_value(&outcome.report).map(|report| (name, report))
                            })
                            .collect::<serde_json::Result<serde_json::Map<_, _>>>()?;
                        serde_json::to_string_pretty(&by_variant)?
                    }
                };
                writeln!(self.writer(), "{json}")?;
            }
        }

        Ok(())
    }

    fn print_summary(&self, report: &ConflictReport) -> anyhow::Result<()> {
        let summary = report.summary();
        let mut lines = summary.lines();

        if let Some(headline) = lines.next() {
            let headline = if report.is_clean() {
                headline.green()
            } else {
                headline.red().bold()
            };
            writeln!(self.writer(), "{headline}")?;
        }
        for line in lines {
            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }
}
