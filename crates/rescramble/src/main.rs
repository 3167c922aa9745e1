//! Command line front end: discover a project on disk, run the rename job,
//! and write the transformed tree to an output directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};

use rescramble::{
    config::ObfuscateConfig,
    generator::NameRegistry,
    markup,
    orchestrator::{Obfuscator, Outcome},
    progress::{CancelFlag, LogSink},
    project::{Project, ProjectLock, SourceFile},
};

#[derive(Debug, Parser)]
#[command(name = "rescramble", version)]
#[command(about = "Obfuscate declared resource identifiers in a UI project")]
struct Cli {
    /// Project root containing a res/ directory.
    project: PathBuf,

    /// Configuration file (defaults to rescramble.toml in the project root).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible name generation; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Report what would be renamed without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Output directory for the transformed project.
    #[arg(short, long, default_value = "obfuscated")]
    output: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let mut config = match &cli.config {
        Some(path) => ObfuscateConfig::load(path)?,
        None => ObfuscateConfig::load_or_default(&cli.project)?,
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let project = load_project(&cli.project)?;
    if project.markup.is_empty() {
        bail!("no markup files found under {}", cli.project.join("res").display());
    }
    info!(
        "loaded {} markup files and {} source files from {}",
        project.markup.len(),
        project.sources.len(),
        cli.project.display()
    );

    let lock = ProjectLock::new(project);
    let names = NameRegistry::new(config.name_length, config.seed);
    let mut sink = LogSink;
    let cancel = CancelFlag::new();
    let report = Obfuscator::new(&lock, &names, &mut sink, &cancel, &config).run()?;

    for line in &report.diagnostics {
        println!("{line}");
    }
    match report.outcome {
        Outcome::Done => info!("renamed {} resources", report.renamed),
        Outcome::Cancelled => info!("cancelled after {} renames", report.renamed),
    }

    if cli.dry_run {
        info!("dry run, nothing written");
        return Ok(());
    }
    write_project(&lock.into_inner(), &cli.output)?;
    info!("wrote transformed project to {}", cli.output.display());
    Ok(())
}

/// Read every markup file under `res/<dir>/` plus the project's source
/// files. Markup order is directory order, which fixes first-occurrence
/// ownership for duplicated declarations.
fn load_project(root: &Path) -> Result<Project> {
    let res = root.join("res");
    let mut markup = Vec::new();
    if res.is_dir() {
        let mut dirs: Vec<PathBuf> = fs::read_dir(&res)
            .with_context(|| format!("failed to read {}", res.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();
        for dir in dirs {
            let dir_name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .context("non-unicode resource directory name")?
                .to_owned();
            let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
                .collect();
            files.sort();
            for path in files {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .context("non-unicode markup file name")?
                    .to_owned();
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                debug!("parsing {}", path.display());
                let file = markup::parse(&dir_name, &name, &text)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                markup.push(file);
            }
        }
    }

    let mut sources = Vec::new();
    collect_sources(root, root, &mut sources)?;
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(Project::new(markup, sources))
}

fn collect_sources(root: &Path, dir: &Path, out: &mut Vec<SourceFile>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            // res/ holds markup only and build output never carries accessors.
            let skip = path.file_name().is_some_and(|n| n == "res" || n == "build");
            if !skip {
                collect_sources(root, &path, out)?;
            }
        } else if path.extension().is_some_and(|ext| ext == "kt" || ext == "java") {
            let rel = path
                .strip_prefix(root)
                .expect("source path under project root")
                .to_str()
                .context("non-unicode source file path")?
                .replace('\\', "/");
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            out.push(SourceFile { path: rel, text });
        }
    }
    Ok(())
}

fn write_project(project: &Project, output: &Path) -> Result<()> {
    for file in &project.markup {
        let dir = output.join("res").join(&file.dir);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(&file.name);
        fs::write(&path, markup::render(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    for source in &project.sources {
        let path = output.join(&source.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, &source.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
