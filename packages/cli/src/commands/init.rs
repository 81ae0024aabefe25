use super::save_project;
use crate::config::{Config, DEFAULT_CONFIG_NAME, DEFAULT_PROJECT_FILE};
use anyhow::Result;
use blocksmith_model::Project;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project name
    #[arg(short, long, default_value = "Untitled")]
    pub name: String,

    /// Output directory for exports
    #[arg(short, long, default_value = "dist")]
    pub out_dir: String,

    /// Force overwrite existing config and project
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blocksmith project...".bright_blue().bold());

    let config = Config {
        out_dir: args.out_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let project_path = cwd.join(DEFAULT_PROJECT_FILE);
    if !project_path.exists() || args.force {
        let mut project = Project::new(args.name);
        project.normalize();
        save_project(&project, &project_path)?;
        println!("  {} Created {}", "✓".green(), DEFAULT_PROJECT_FILE);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: blocksmith import page.html");
    println!("  2. Run: blocksmith export");
    println!("  3. Check output in {}/", args.out_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_project;

    #[test]
    fn test_init_writes_config_and_project() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            name: "Landing".into(),
            out_dir: "public".into(),
            force: false,
        };
        init(args, dir.path()).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.out_dir, "public");

        let project = load_project(&dir.path().join(DEFAULT_PROJECT_FILE)).unwrap();
        assert_eq!(project.name, "Landing");
        assert_eq!(project.sections.len(), 1);
    }
}
