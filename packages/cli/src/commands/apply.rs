use super::{blob_store, load_project, save_project};
use crate::config::{Config, DEFAULT_PROJECT_FILE};
use anyhow::{Context, Result};
use blocksmith_editor::{HistoryLog, MemoryHistoryStorage, Mutation, ProjectStore};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// JSON file holding an array of mutations
    pub mutations: PathBuf,

    /// Project file to edit in place
    #[arg(short, long, default_value = DEFAULT_PROJECT_FILE)]
    pub project: PathBuf,
}

pub async fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let project_path = cwd.join(&args.project);
    let project = load_project(&project_path)?;

    let mutations_path = cwd.join(&args.mutations);
    let content = fs::read_to_string(&mutations_path)
        .with_context(|| format!("Cannot read {}", mutations_path.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid mutation list {}", mutations_path.display()))?;

    let history = HistoryLog::new(config.history, Box::new(MemoryHistoryStorage::new()));
    let mut store = ProjectStore::open_with(project, blob_store(&config, cwd), history);

    println!("{}", "✏️  Applying mutations...".bright_blue().bold());
    let mut applied = 0;
    let mut dropped = 0;
    for mutation in mutations {
        let label = mutation.label();
        match store.apply(mutation).await {
            Some(_) => {
                applied += 1;
                println!("  {} {}", "✓".green(), label);
            }
            None => {
                dropped += 1;
                println!("  {} {} {}", "✗".red(), label, "(target not found)".dimmed());
            }
        }
    }

    save_project(&store.to_project(), &project_path)?;

    println!();
    if dropped == 0 {
        println!("{} Applied {} mutations", "✅".green(), applied);
    } else {
        println!(
            "{} Applied {} mutations, {} dropped",
            "⚠️".yellow(),
            applied,
            dropped
        );
    }
    Ok(())
}
