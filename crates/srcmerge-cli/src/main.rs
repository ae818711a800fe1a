use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use similar::TextDiff;
use srcmerge_core::config::Settings;
use srcmerge_core::logging::init_logging;
use srcmerge_engine::{merge_all, parse_path, MergeOutput};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "srcmerge",
    about = "Merge Go source files into one, renaming conflicting declarations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level or filter directive; RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write logs to srcmerge.log in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the input files and write the result
    Merge(MergeArgs),
    /// Merge in memory and diff against the existing output file
    Check(MergeArgs),
    /// Write a template settings file
    Init {
        #[arg(default_value = "srcmerge.json")]
        path: PathBuf,
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct MergeArgs {
    /// Go file to merge; repeat in merge order
    #[arg(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// Disambiguation tag for the matching -f file
    #[arg(short = 'r', long = "tag")]
    tags: Vec<String>,

    /// Package name of the merged file
    #[arg(short, long)]
    package: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the merge decisions as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Merge(args) => cmd_merge(&cli, args),
        Commands::Check(args) => {
            if !cmd_check(&cli, args)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Init { path, force } => cmd_init(path, *force),
    }
}

/// Settings file (if any) with command-line overrides applied.
fn load_settings(args: &MergeArgs) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(package) = &args.package {
        settings.package = package.clone();
    }
    if let Some(output) = &args.output {
        settings.output = Some(output.clone());
    }
    if let Some(report) = &args.report {
        settings.report = Some(report.clone());
    }
    Ok(settings)
}

fn start_logging(
    cli: &Cli,
    settings: &Settings,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&settings.logging.level);
    let dir = cli.log_dir.as_deref().or(settings.logging.dir.as_deref());
    init_logging(level, dir)
}

fn run_merge(settings: &Settings, args: &MergeArgs) -> anyhow::Result<MergeOutput> {
    let units = settings.resolve_units(&args.files, &args.tags)?;

    let mut parsed = Vec::with_capacity(units.len());
    for unit in &units {
        let file = parse_path(&unit.path)
            .with_context(|| format!("failed to parse {}", unit.path.display()))?;
        tracing::debug!(
            path = %unit.path.display(),
            tag = %unit.tag,
            declarations = file.decls.len(),
            "parsed unit"
        );
        parsed.push((file, unit.tag.clone()));
    }

    let output = merge_all(&settings.package, parsed).context("merge failed")?;
    tracing::info!(
        units = units.len(),
        renames = output.renames().count(),
        "merged {} units into package {}",
        units.len(),
        settings.package
    );

    if let Some(report) = &settings.report {
        let json = serde_json::to_string_pretty(&output.decisions)?;
        std::fs::write(report, json)
            .with_context(|| format!("failed to write report {}", report.display()))?;
    }
    Ok(output)
}

fn cmd_merge(cli: &Cli, args: &MergeArgs) -> anyhow::Result<()> {
    let settings = load_settings(args)?;
    let _guard = start_logging(cli, &settings)?;

    let rendered = run_merge(&settings, args)?.render();
    match &settings.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote merged file");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Returns `false` when the output file is missing or out of date.
fn cmd_check(cli: &Cli, args: &MergeArgs) -> anyhow::Result<bool> {
    let settings = load_settings(args)?;
    let _guard = start_logging(cli, &settings)?;

    let Some(path) = settings.output.clone() else {
        anyhow::bail!("check needs an output file (-o or \"output\" in the settings file)");
    };
    let rendered = run_merge(&settings, args)?.render();

    let existing = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("{} does not exist", path.display());
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    if existing == rendered {
        println!("{} is up to date", path.display());
        return Ok(true);
    }

    let label = path.display().to_string();
    let diff = TextDiff::from_lines(existing.as_str(), rendered.as_str());
    let mut unified = diff.unified_diff();
    unified.context_radius(3).header(&label, "merged");
    print!("{unified}");
    Ok(false)
}

fn cmd_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists()
        && !force
        && !dialoguer::Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()?
    {
        println!("Left {} unchanged.", path.display());
        return Ok(());
    }

    Settings::template().save(path)?;
    println!("Wrote {}", path.display());
    println!("Edit the unit list, then run: srcmerge merge --config {}", path.display());
    Ok(())
}
