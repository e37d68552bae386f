//! Kautian CLI
//!
//! - `convert`: workbook → `kautian.json` (document tree) + `kautian.csv` (rows)
//! - `inspect`: table sizes, row counts and orphaned rows, nothing written
//! - `publish`: hash-checked, timestamped publishing into a `public/` tree

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use kautian_core::{transform, OrphanReport, Schema};
use kautian_io::{convert_workbook, load_schema, load_workbook, publish, PublishOutcome};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "kautian")]
#[command(author, version, about = "Reshape the Kautian dictionary workbook into JSON and CSV")]
struct Cli {
    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Schema override (JSON); defaults to the Kautian sheet vocabulary.
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON workbook into the document tree and the flat table.
    Convert {
        /// Input workbook (sheet name → rows)
        input: PathBuf,
        /// Output document tree
        #[arg(long, default_value = "kautian.json")]
        json: PathBuf,
        /// Output flat table
        #[arg(long, default_value = "kautian.csv")]
        csv: PathBuf,
    },

    /// Report sheet sizes, entry/definition/row counts and orphaned rows.
    Inspect {
        /// Input workbook
        input: PathBuf,
    },

    /// Publish a new version into the public tree when the workbook changed.
    Publish {
        /// Input workbook
        input: PathBuf,
        /// Public directory holding `manifest.json` and version directories
        #[arg(long, default_value = "public")]
        public: PathBuf,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let schema = load_schema(cli.schema.as_deref())?;

    match cli.command {
        Commands::Convert { input, json, csv } => cmd_convert(&input, &json, &csv, &schema),
        Commands::Inspect { input } => cmd_inspect(&input, &schema),
        Commands::Publish { input, public } => cmd_publish(&input, &public, &schema),
    }
}

fn cmd_convert(input: &Path, json: &Path, csv: &Path, schema: &Schema) -> Result<()> {
    println!("{} {}", "Converting".green().bold(), input.display());
    let out = convert_workbook(input, json, csv, schema)?;
    println!(
        "  {} {} (entries={})",
        "→".cyan(),
        json.display(),
        out.documents.len()
    );
    println!("  {} {} (rows={})", "→".cyan(), csv.display(), out.rows.len());
    for line in orphan_lines(&out.orphans) {
        println!("{line}");
    }
    Ok(())
}

fn cmd_inspect(input: &Path, schema: &Schema) -> Result<()> {
    let workbook = load_workbook(input, schema)?;
    println!("{} {}", "Workbook".green().bold(), input.display());
    for name in schema.sheet_names() {
        match workbook.get(name) {
            Some(table) => println!("  {:<16} {:>8}", name, table.len()),
            None => println!("  {:<16} {:>8}", name, "missing".yellow()),
        }
    }

    let out = transform(&workbook, schema)?;
    println!();
    println!("  {:<16} {:>8}", "entries", out.documents.len());
    println!("  {:<16} {:>8}", "definitions", out.definition_count(schema));
    println!("  {:<16} {:>8}", "rows", out.rows.len());
    println!("  {:<16} {:>8}", "columns", out.rows.columns().len());
    for line in orphan_lines(&out.orphans) {
        println!("{line}");
    }
    Ok(())
}

fn cmd_publish(input: &Path, public: &Path, schema: &Schema) -> Result<()> {
    println!("{} {}", "Publishing".green().bold(), input.display());
    match publish(input, public, schema, chrono::Local::now())? {
        PublishOutcome::Unchanged => {
            println!("  {} no changes, manifest hashes match", "✓".green());
        }
        PublishOutcome::Published {
            version_dir,
            changed,
        } => {
            println!("  {} changed: {}", "•".cyan(), changed.join(", "));
            println!("  {} {}", "→".cyan(), version_dir.display());
        }
    }
    Ok(())
}

/// Report lines for rows excluded from the output; none when nothing was.
fn orphan_lines(orphans: &OrphanReport) -> Vec<String> {
    if orphans.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "  {} excluded {} rows with unknown parents (definitions={}, sentences={})",
        "!".yellow().bold(),
        orphans.total(),
        orphans.definitions,
        orphans.sentences
    )];
    lines.extend(
        orphans
            .relations
            .iter()
            .map(|(name, count)| format!("    {:<16} {:>8}", name, count)),
    );
    lines
}
