use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use pk_sdk::{BuildOutcome, Packager, PatchConfig, WorkdirStatus, CONFIG_FILE_NAME};
use pk_types::VersionTuple;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let packager = open_packager(cli.config.as_deref())?;
    match cli.command {
        Command::Build => cmd_build(&packager, cli.format),
        Command::Index => cmd_index(&packager, cli.format),
        Command::Status => cmd_status(&packager, cli.format),
        Command::History(args) => cmd_history(&packager, args, cli.format),
    }
}

fn open_packager(config: Option<&Path>) -> anyhow::Result<Packager> {
    let config = match config {
        Some(path) => PatchConfig::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("reading current directory")?;
            PatchConfig::load_or_default(&cwd.join(CONFIG_FILE_NAME), &cwd)?
        }
    };
    Ok(Packager::new(config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_build(packager: &Packager, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = packager.build_patch()?;
    if format == OutputFormat::Json {
        return print_json(&outcome);
    }
    match outcome {
        BuildOutcome::IndexCreated { records } => {
            println!("{} Created index with {} files", "✓".green().bold(), records.to_string().bold());
            println!("  {}", packager.index_path().display().to_string().dimmed());
            println!("  Nothing packaged on the first run.");
        }
        BuildOutcome::NoChanges { scanned } => {
            println!("No files need updating ({scanned} scanned).");
        }
        BuildOutcome::Built(report) => {
            println!("{} Built {}", "✓".green().bold(), report.archive_name.yellow().bold());
            println!("  Files: {}", report.file_count.to_string().bold());
            println!("  Size: {} bytes", report.total_size);
            println!("  Archive: {}", report.archive_path.display());
            println!("  Manifest: {}", report.entry.to_string().cyan());
        }
    }
    Ok(())
}

fn cmd_index(packager: &Packager, format: OutputFormat) -> anyhow::Result<()> {
    let records = packager.reindex()?;
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "path": packager.index_path(),
            "records": records,
        }));
    }
    println!("{} Rebuilt index: {} files", "✓".green().bold(), records.to_string().bold());
    Ok(())
}

fn cmd_status(packager: &Packager, format: OutputFormat) -> anyhow::Result<()> {
    let status = packager.status()?;
    if format == OutputFormat::Json {
        return print_json(&status);
    }
    let Some(status) = status else {
        println!("No index yet. The next build creates one.");
        return Ok(());
    };
    print_status(&status);
    Ok(())
}

fn print_status(status: &WorkdirStatus) {
    if status.is_clean() {
        println!("Nothing to package. {} files unchanged.", status.unchanged);
    } else {
        println!("Changes for the next patch ({}):", status.change_count().to_string().bold());
        for key in &status.new {
            println!("  {} {}", "new:     ".green(), key);
        }
        for key in &status.modified {
            println!("  {} {}", "modified:".yellow(), key);
        }
    }
    if !status.missing.is_empty() {
        println!("\nDeleted since indexed (not packaged):");
        for key in &status.missing {
            println!("  {}", key.dimmed());
        }
    }
}

fn cmd_history(packager: &Packager, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let version: VersionTuple = match args.target {
        Some(v) => v.parse().with_context(|| format!("invalid version {v:?}"))?,
        None => packager.version()?,
    };
    let entries = packager.history(&version)?;
    if format == OutputFormat::Json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No patches published for {}.", version.version_dir().yellow());
        return Ok(());
    }
    println!("Patches for {}:", version.version_dir().yellow().bold());
    for entry in &entries {
        println!("  {}  {} bytes", entry.url, entry.size_bytes.to_string().bold());
    }
    Ok(())
}
