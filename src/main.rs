use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use treepatch::areas::project::Project;
use treepatch::artifacts::apply::FuzzConfig;
use treepatch::artifacts::core::Output;
use treepatch::artifacts::diff::DiffConfig;
use treepatch::artifacts::diff::diff_config::{DEFAULT_CONTEXT_LINES, DEFAULT_RENAME_THRESHOLD};
use treepatch::artifacts::diff::tree_diff::ChangeFilter;
use treepatch::commands::porcelain::apply::{ApplyOptions, ReportFormat};
use treepatch::commands::porcelain::diff::DiffOptions;
use treepatch::commands::porcelain::script::ScriptOptions;

const LOG_ENV: &str = "TREEPATCH_LOG";

#[derive(Parser)]
#[command(
    name = "treepatch",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Keep source variants as patches against a shared base tree",
    long_about = "treepatch records how variant source trees differ from a base tree as \
    line-oriented patch documents, and rebuilds the variants by applying those patches \
    to a (possibly updated) base, tolerating drift and reporting what could not be placed.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
    #[arg(short, long, global = true, help = "Only log errors")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "diff",
        about = "Compute the patches turning a base tree into a variant tree",
        long_about = "This command compares two directory trees and prints the resulting patch set, \
        or rewrites the patch documents of a patch directory when --output is given."
    )]
    Diff {
        #[arg(index = 1, help = "The base tree")]
        base: PathBuf,
        #[arg(index = 2, help = "The edited variant tree")]
        variant: PathBuf,
        #[arg(short, long, help = "Patch directory to write one document per file into")]
        output: Option<PathBuf>,
        #[arg(
            short = 'U',
            long,
            env = "TREEPATCH_CONTEXT",
            default_value_t = DEFAULT_CONTEXT_LINES,
            help = "Unchanged lines kept around each change"
        )]
        context: usize,
        #[arg(
            long,
            env = "TREEPATCH_RENAME_THRESHOLD",
            default_value_t = DEFAULT_RENAME_THRESHOLD,
            help = "Minimum similarity for pairing a deletion and an addition as a rename"
        )]
        rename_threshold: f64,
        #[arg(long, help = "Report renames as a deletion plus an addition")]
        no_renames: bool,
        #[arg(
            long = "diff-filter",
            value_parser = parse_change_filter,
            help = "Only keep changes of the given kinds (any of A, D, M, R)"
        )]
        filter: Option<ChangeFilter>,
    },
    #[command(
        name = "apply",
        about = "Rebuild a variant tree from the base tree and its patches",
        long_about = "This command applies a patch directory to the base tree and writes the result \
        to the output directory. Hunks that cannot be placed are reported and, with --reject-dir, \
        written out as reject documents."
    )]
    Apply {
        #[arg(index = 1, help = "The base tree")]
        base: PathBuf,
        #[arg(index = 2, help = "The patch directory")]
        patches: PathBuf,
        #[arg(short, long, help = "Where the rebuilt tree is written")]
        output: PathBuf,
        #[arg(
            short = 'F',
            long,
            env = "TREEPATCH_FUZZ",
            default_value_t = 0,
            help = "Mismatched context lines a hunk may tolerate (at most 2)"
        )]
        fuzz: u8,
        #[arg(long, env = "TREEPATCH_RADIUS", help = "How far from its recorded position a hunk is searched for")]
        radius: Option<usize>,
        #[arg(long, help = "Directory for reject documents of unplaced hunks")]
        reject_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text, help = "Conflict report format")]
        report: ReportFormat,
        #[arg(long, help = "Exit with an error when any conflict is reported")]
        strict: bool,
        #[arg(
            long,
            help = "Treat each subdirectory of the patch directory as a variant, applied in parallel"
        )]
        variants: bool,
    },
    #[command(
        name = "script",
        about = "Rebuild a tree by running JSON directive scripts",
        long_about = "This command runs every <file>.json script of a script directory against the \
        matching file of the base tree and writes the result to the output directory."
    )]
    Script {
        #[arg(index = 1, help = "The base tree")]
        base: PathBuf,
        #[arg(index = 2, help = "The script directory")]
        scripts: PathBuf,
        #[arg(short, long, help = "Where the rebuilt tree is written")]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text, help = "Conflict report format")]
        report: ReportFormat,
        #[arg(long, help = "Exit with an error when any conflict is reported")]
        strict: bool,
    },
    #[command(
        name = "ls-tree",
        about = "List the files of a tree with their content ids",
        long_about = "This command captures a directory tree and prints one line per file, \
        followed by the id of the whole tree."
    )]
    LsTree {
        #[arg(index = 1, help = "The tree to list")]
        dir: PathBuf,
    },
    #[command(
        name = "verify",
        about = "Check that a patch directory decodes and validates",
        long_about = "This command decodes every patch document of a patch directory and prints \
        what each file patch would change."
    )]
    Verify {
        #[arg(index = 1, help = "The patch directory")]
        patches: PathBuf,
    },
}

fn parse_change_filter(s: &str) -> Result<ChangeFilter, String> {
    ChangeFilter::try_parse(s).ok_or_else(|| format!("invalid filter {s:?}, expected letters from ADMR"))
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let output = Output::detect();
    if !output.is_terminal() {
        colored::control::set_override(false);
    }

    let pwd = std::env::current_dir()?;
    let project = Project::new(&pwd, output.writer())?;

    let (conflicts, strict) = match cli.command {
        Commands::Diff {
            base,
            variant,
            output,
            context,
            rename_threshold,
            no_renames,
            filter,
        } => {
            let opts = DiffOptions {
                base,
                variant,
                output,
                config: DiffConfig::new(context, !no_renames, rename_threshold),
                filter,
            };
            project.diff(&opts)?;
            (0, false)
        }
        Commands::Apply {
            base,
            patches,
            output,
            fuzz,
            radius,
            reject_dir,
            report,
            strict,
            variants,
        } => {
            let opts = ApplyOptions {
                base,
                patches,
                output,
                fuzz: FuzzConfig::new(fuzz, radius),
                reject_dir,
                report,
                variants,
            };
            (project.apply(&opts).await?, strict)
        }
        Commands::Script {
            base,
            scripts,
            output,
            report,
            strict,
        } => {
            let opts = ScriptOptions {
                base,
                scripts,
                output,
                report,
            };
            (project.script(&opts)?, strict)
        }
        Commands::LsTree { dir } => {
            project.ls_tree(&dir)?;
            (0, false)
        }
        Commands::Verify { patches } => {
            project.verify(&patches)?;
            (0, false)
        }
    };

    // the pager only shows what was written once the project's writer is gone
    drop(project);
    output.finish()?;

    if strict && conflicts > 0 {
        anyhow::bail!("{conflicts} conflict(s)");
    }

    Ok(())
}
