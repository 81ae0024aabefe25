use super::save_project;
use crate::config::{Config, ImportMode, DEFAULT_PROJECT_FILE};
use anyhow::{anyhow, Context, Result};
use blocksmith_importer::{import_components, import_sections};
use blocksmith_model::{Project, Section};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// HTML file, or a directory of .html files
    pub input: PathBuf,

    /// Project file to write
    #[arg(short, long, default_value = DEFAULT_PROJECT_FILE)]
    pub output: PathBuf,

    /// Project name (defaults to the input's file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Import a flat component list into a single section
    #[arg(long)]
    pub flat: bool,
}

pub fn import(args: ImportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = cwd.join(&args.input);
    let mode = if args.flat { ImportMode::Flat } else { config.import.mode };

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_html_files(&input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    if files.is_empty() {
        println!("{}", "⚠️  No .html files found".yellow());
        return Ok(());
    }

    println!("{}", "📥 Importing HTML...".bright_blue().bold());

    let mut sections = Vec::new();
    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("Cannot read {}", file.display()))?;
        let imported = import_source(&source, mode);
        let relative = file.strip_prefix(cwd).unwrap_or(file);
        println!(
            "  {} {} → {} sections",
            "✓".green(),
            relative.display(),
            imported.len()
        );
        sections.extend(imported);
    }

    let name = args.name.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Imported")
            .to_string()
    });
    let mut project = Project::new(name).with_sections(sections);
    project.normalize();

    let output = cwd.join(&args.output);
    save_project(&project, &output)?;

    println!();
    println!(
        "{} Imported {} components into {}",
        "✅".green(),
        project.component_count(),
        args.output.display()
    );
    Ok(())
}

pub(crate) fn import_source(source: &str, mode: ImportMode) -> Vec<Section> {
    match mode {
        ImportMode::Sections => import_sections(source),
        ImportMode::Flat => {
            let components = import_components(source);
            if components.is_empty() {
                return Vec::new();
            }
            let mut section = Section::new();
            section.components = components;
            vec![section]
        }
    }
}

fn find_html_files(dir: &Path) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("html") | Some("htm")
            )
        })
        .collect();
    debug!(count = files.len(), dir = %dir.display(), "Found HTML files");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_project;

    const PAGE: &str = r#"<header><h1>Acme</h1></header>
        <section style="display:flex"><div>A</div><div>B</div></section>"#;

    #[test]
    fn test_flat_mode_wraps_single_section() {
        let sections = import_source(PAGE, ImportMode::Flat);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].columns, 1);
        assert!(!sections[0].components.is_empty());
    }

    #[test]
    fn test_flat_mode_empty_input() {
        assert!(import_source("", ImportMode::Flat).is_empty());
    }

    #[test]
    fn test_import_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("b.html"), "<section><p>Second page</p></section>").unwrap();
        fs::write(pages.join("a.html"), "<section><p>First page</p></section>").unwrap();
        fs::write(pages.join("notes.txt"), "ignored").unwrap();

        let args = ImportArgs {
            input: PathBuf::from("pages"),
            output: PathBuf::from("site.json"),
            name: None,
            flat: false,
        };
        import(args, dir.path()).unwrap();

        let project = load_project(&dir.path().join("site.json")).unwrap();
        assert_eq!(project.name, "pages");
        assert_eq!(project.sections.len(), 2);
        assert_eq!(project.sections[0].components[0].content, "First page");
        assert_eq!(project.sections[1].components[0].content, "Second page");
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = ImportArgs {
            input: PathBuf::from("nope.html"),
            output: PathBuf::from(DEFAULT_PROJECT_FILE),
            name: None,
            flat: false,
        };
        assert!(import(args, dir.path()).is_err());
    }
}
