mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, export, import, init, ApplyArgs, ExportArgs, ImportArgs, InitArgs};
use tracing_subscriber::EnvFilter;

/// Blocksmith CLI - assemble pages from blocks, round-trip them through HTML
#[derive(Parser, Debug)]
#[command(name = "blocksmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Blocksmith project
    Init(InitArgs),

    /// Import HTML into a project file
    Import(ImportArgs),

    /// Export a project to HTML and CSS
    Export(ExportArgs),

    /// Apply a list of mutations to a project file
    Apply(ApplyArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Import(args) => import(args, &cwd),
        Command::Export(args) => export(args, &cwd).await,
        Command::Apply(args) => apply(args, &cwd).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
