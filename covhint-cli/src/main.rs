mod config;
mod explain;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, LocalizeOverrides};
use covhint_core::adapters::{FsReportSource, FsWritePort};
use covhint_core::pipeline::{HINTS_FILE, ToolError, run_localize, write_localize_artifacts};
use covhint_core::settings::LocalizeSettings;
use covhint_domain::builtin_source_metas;
use covhint_types::tool::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "covhint",
    version,
    about = "Localizes per-test code hints from diff and coverage reports."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Correlate diff and coverage reports into per-test change blocks.
    Localize(LocalizeArgs),
    /// List the knowledge sources in engine order.
    ListSources(ListSourcesArgs),
    /// Explain what a knowledge source derives and when it runs.
    Explain(ExplainArgs),
}

#[derive(Debug, Parser)]
struct LocalizeArgs {
    /// Exercise root holding covhint.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Artifacts directory containing diff/ and coverage/ reports (default: <root>/artifacts).
    #[arg(long)]
    artifacts_dir: Option<Utf8PathBuf>,

    /// Output directory for hints.json (default: <artifacts_dir>/covhint).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Solution checkout to read code snippets from.
    #[arg(long)]
    solution_root: Option<Utf8PathBuf>,

    /// Lines a change block may grow by on each side (0 disables potential blocks).
    #[arg(long)]
    context_lines: Option<u32>,

    /// Emit only the confirmed lines of potential blocks.
    #[arg(long, default_value_t = false)]
    no_potential: bool,

    /// Abort once this many knowledge source applications have run.
    #[arg(long)]
    max_applications: Option<usize>,
}

#[derive(Debug, Parser)]
struct ListSourcesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Source key or engine name to explain (e.g., "merge-blocks", "compute_common_lines").
    source_key: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Localize(args) => cmd_localize(args),
        Command::ListSources(args) => cmd_list_sources(args),
        Command::Explain(args) => cmd_explain(args),
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<ToolError>())
        .map_or(1, ToolError::exit_code)
}

fn cmd_localize(args: LocalizeArgs) -> anyhow::Result<()> {
    let root = args.root;
    let artifacts_dir = args
        .artifacts_dir
        .unwrap_or_else(|| root.join("artifacts"));
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| artifacts_dir.join("covhint"));

    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(&root).context("load covhint.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_localize_args(
        &root,
        &LocalizeOverrides {
            context_lines: args.context_lines,
            no_potential: args.no_potential,
            max_applications: args.max_applications,
            solution_root: args.solution_root,
        },
    );

    debug!(
        "merged config: context_lines={}, include_potential={}, max_applications={:?}, solution_root={:?}",
        merged.context_lines, merged.include_potential, merged.max_applications, merged.solution_root
    );

    let settings = LocalizeSettings {
        artifacts_dir: artifacts_dir.clone(),
        out_dir: out_dir.clone(),
        solution_root: merged.solution_root,
        context_lines: merged.context_lines,
        include_potential: merged.include_potential,
        max_applications: merged.max_applications,
    };

    let outcome = run_localize(&settings, &FsReportSource::new(artifacts_dir), tool_info())?;
    write_localize_artifacts(&outcome, &out_dir, &FsWritePort).context("write hints")?;

    let summary = &outcome.report.summary;
    println!(
        "{} hints ({} potential) across {} grouped files -> {}",
        outcome.report.hints.len(),
        summary.potential_blocks,
        summary.grouped_files,
        out_dir.join(HINTS_FILE)
    );
    info!("wrote hints to {}", out_dir);
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "covhint".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{list_source_keys, lookup_source};

    let Some(source) = lookup_source(&args.source_key) else {
        let available = list_source_keys().join(", ");
        anyhow::bail!(
            "Unknown source key: '{}'\n\nAvailable sources: {}",
            args.source_key,
            available
        );
    };

    println!("================================================================================");
    println!("SOURCE: {}", source.title);
    println!("================================================================================");
    println!();
    println!("Key:     {}", source.key);
    println!("Name:    {}", source.source_name);
    if let Some(meta) = builtin_source_metas()
        .into_iter()
        .find(|m| m.name == source.source_name)
    {
        println!("Reads:   {}", meta.reads.join(", "));
        println!("Writes:  {}", meta.writes);
    }
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", source.description);
    println!();

    println!("PRECONDITION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", source.precondition);
    println!();

    println!("PROGRESS");
    println!("--------------------------------------------------------------------------------");
    println!("{}", source.progress);
    println!();

    Ok(())
}

fn cmd_list_sources(args: ListSourcesArgs) -> anyhow::Result<()> {
    use explain::lookup_source;

    let metas = builtin_source_metas();
    match args.format {
        OutputFormat::Text => {
            println!("Knowledge sources (engine order):\n");
            println!("  {:<16} {:<30} SUMMARY", "KEY", "NAME");
            println!("  {:<16} {:<30} -------", "---", "----");
            for meta in &metas {
                let key = lookup_source(meta.name).map_or("-", |s| s.key);
                println!("  {:<16} {:<30} {}", key, meta.name, meta.summary);
            }
            println!();
            println!("Use 'covhint explain <key>' for details.");
        }
        OutputFormat::Json => {
            let sources: Vec<_> = metas
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "key": lookup_source(m.name).map(|s| s.key),
                        "name": m.name,
                        "reads": m.reads,
                        "writes": m.writes,
                        "summary": m.summary,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
    }
    Ok(())
}
