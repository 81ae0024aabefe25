use super::{blob_store, load_project};
use crate::config::{Config, DEFAULT_PROJECT_FILE};
use anyhow::{anyhow, Context, Result};
use blocksmith_compiler_html::CompileOptions;
use blocksmith_editor::ProjectStore;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Project file to export
    #[arg(default_value = DEFAULT_PROJECT_FILE)]
    pub project: PathBuf,

    /// Only emit one target (html, css)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Emit HTML without indentation
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Html,
    Css,
}

impl Target {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "html" => Ok(Target::Html),
            "css" => Ok(Target::Css),
            other => Err(anyhow!("Unknown target: {}. Use: html or css", other)),
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Target::Html => "index.html",
            Target::Css => "styles.css",
        }
    }
}

pub async fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let targets = match args.target.as_deref() {
        Some(name) => vec![Target::parse(name)?],
        None if args.stdout => vec![Target::Html],
        None => vec![Target::Html, Target::Css],
    };

    let project = load_project(&cwd.join(&args.project))?;
    let store = ProjectStore::open(project, blob_store(&config, cwd));

    let options = CompileOptions {
        title: config.page_title.clone(),
        pretty: !args.compact,
        ..Default::default()
    };
    let output = store.export(&options).await;

    if args.stdout {
        for target in targets {
            match target {
                Target::Html => print!("{}", output.html),
                Target::Css => print!("{}", output.css),
            }
        }
        return Ok(());
    }

    let out_dir = match &args.out_dir {
        Some(dir) => cwd.join(dir),
        None => config.get_out_dir(cwd),
    };
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Cannot create {}", out_dir.display()))?;

    println!("{}", "🔨 Exporting page...".bright_blue().bold());
    for target in targets {
        let path = out_dir.join(target.file_name());
        let content = match target {
            Target::Html => &output.html,
            Target::Css => &output.css,
        };
        fs::write(&path, content).with_context(|| format!("Cannot write {}", path.display()))?;
        println!("  {} {}", "✓".green(), path.strip_prefix(cwd).unwrap_or(&path).display());
    }

    println!();
    println!(
        "{} Exported {} sections",
        "✅".green(),
        store.sections().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::save_project;
    use blocksmith_model::{Component, ComponentType, Project, Section};

    #[tokio::test]
    async fn test_export_writes_html_and_css() {
        let dir = tempfile::tempdir().unwrap();
        let mut section = Section::with_columns(2);
        section
            .components
            .push(Component::new(ComponentType::Heading).with_content("Hello"));
        let project = Project::new("Site").with_sections(vec![section]);
        save_project(&project, &dir.path().join(DEFAULT_PROJECT_FILE)).unwrap();

        let args = ExportArgs {
            project: PathBuf::from(DEFAULT_PROJECT_FILE),
            target: None,
            stdout: false,
            out_dir: None,
            compact: false,
        };
        export(args, dir.path()).await.unwrap();

        let html = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        let css = fs::read_to_string(dir.path().join("dist/styles.css")).unwrap();
        assert!(html.contains("Hello"));
        assert!(html.contains(&css));
    }

    #[tokio::test]
    async fn test_unknown_target_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = ExportArgs {
            project: PathBuf::from(DEFAULT_PROJECT_FILE),
            target: Some("react".into()),
            stdout: true,
            out_dir: None,
            compact: false,
        };
        assert!(export(args, dir.path()).await.is_err());
    }
}
