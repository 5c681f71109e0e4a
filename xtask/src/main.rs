use anyhow::Context;
use clap::{Parser, Subcommand};
use covhint_types::schema::{COVHINT_COVERAGE_V1, COVHINT_DIFF_V1, COVHINT_HINTS_V1};
use fs_err as fs;
use std::path::Path;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by covhint.
    PrintSchemas,
    /// Create an empty artifacts layout (artifacts/{diff,coverage}/report.json placeholders).
    InitArtifacts {
        #[arg(long, default_value = "artifacts")]
        dir: String,
        /// Overwrite reports that already exist.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Bless golden fixtures (overwrite expected outputs).
    BlessFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{COVHINT_DIFF_V1}");
            println!("{COVHINT_COVERAGE_V1}");
            println!("{COVHINT_HINTS_V1}");
        }
        Command::InitArtifacts { dir, force } => {
            init_artifacts(Path::new(&dir), force)?;
            println!("initialized {dir}/{{diff,coverage}}/report.json");
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "covhint-domain", "--test", "golden_fixtures"])
                .env("COVHINT_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}

fn init_artifacts(dir: &Path, force: bool) -> anyhow::Result<()> {
    for (sensor, schema) in [("diff", COVHINT_DIFF_V1), ("coverage", COVHINT_COVERAGE_V1)] {
        let sensor_dir = dir.join(sensor);
        fs::create_dir_all(&sensor_dir)
            .with_context(|| format!("create {}", sensor_dir.display()))?;

        let report = sensor_dir.join("report.json");
        if report.exists() && !force {
            continue;
        }
        let placeholder = serde_json::json!({ "schema": schema, "entries": [] });
        let mut json = serde_json::to_string_pretty(&placeholder)?;
        json.push('\n');
        fs::write(&report, json)?;
    }
    Ok(())
}
