use clap::{Parser, Subcommand};
use merge_engine::{format_conflict_markers, unified_diff, write_conflict_file, MergeEngine, StrategySelector};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stencil_core::config::Settings;
use stencil_core::logging::{init_logging, log_dir};
use stencil_core::manifest::{run_batch, write_outputs, BatchReport, Manifest};
use stencil_core::selector::ConfiguredSelector;

#[derive(Parser)]
#[command(name = "stencil", about = "Three-way merge for project template updates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to .stencil data directory
    #[arg(long, default_value = ".stencil")]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge one file from its base, current and updated revisions
    Merge {
        /// Logical template path (selects the strategy)
        path: PathBuf,
        #[arg(long)]
        base: PathBuf,
        #[arg(long)]
        current: PathBuf,
        #[arg(long)]
        updated: PathBuf,
        /// Write the merged file here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write a .conflict file next to the output when conflicts exist
        #[arg(long)]
        conflict_file: bool,
        /// Render conflict markers inline
        #[arg(long)]
        markers: bool,
    },
    /// Show a unified diff between two files
    Diff {
        a: PathBuf,
        b: PathBuf,
        /// Path to show in the diff header
        #[arg(long)]
        path: Option<String>,
    },
    /// Print the merge strategy selected for each path
    Strategy {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Merge every file listed in a JSON manifest
    Batch {
        manifest: PathBuf,
        /// Write results without asking
        #[arg(long)]
        yes: bool,
        /// Print the review as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default settings.json
    Init,
}

fn settings_path(cli: &Cli) -> PathBuf {
    cli.data_dir.join("settings.json")
}

fn build_engine(settings: &Settings) -> MergeEngine {
    let selector = ConfiguredSelector::new(settings.merge.overrides.clone());
    MergeEngine::with_selector(Arc::new(selector))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::load_or_default(&settings_path(&cli))?;
    let _guard = init_logging(&log_dir(&settings.logging, &cli.data_dir), &settings.logging.level)?;

    match &cli.command {
        Commands::Merge {
            path,
            base,
            current,
            updated,
            output,
            conflict_file,
            markers,
        } => {
            let inputs = MergeInputs {
                base,
                current,
                updated,
            };
            cmd_merge(&settings, path, inputs, output.as_deref(), *conflict_file, *markers).await
        }
        Commands::Diff { a, b, path } => cmd_diff(a, b, path.as_deref()).await,
        Commands::Strategy { paths } => cmd_strategy(&settings, paths),
        Commands::Batch { manifest, yes, json } => cmd_batch(&settings, manifest, *yes, *json).await,
        Commands::Init => cmd_init(&cli),
    }
}

struct MergeInputs<'a> {
    base: &'a Path,
    current: &'a Path,
    updated: &'a Path,
}

async fn cmd_merge(
    settings: &Settings,
    path: &Path,
    inputs: MergeInputs<'_>,
    output: Option<&Path>,
    conflict_file: bool,
    markers: bool,
) -> anyhow::Result<ExitCode> {
    let base = tokio::fs::read(inputs.base).await?;
    let current = tokio::fs::read(inputs.current).await?;
    let updated = tokio::fs::read(inputs.updated).await?;

    let engine = build_engine(settings);
    let result = engine.merge_file(&AtomicBool::new(false), path, &base, &current, &updated)?;

    let content = if markers && result.has_conflict() {
        format_conflict_markers(&result.content, &result.conflicts)
    } else {
        result.content.clone()
    };

    match output {
        Some(out) => {
            tokio::fs::write(out, &content).await?;
            eprintln!("Merged {} ({}) -> {}", path.display(), result.strategy, out.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&content)?;
        }
    }

    if !result.has_conflict() {
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("{} conflict(s) in {}", result.conflicts.len(), path.display());
    for conflict in &result.conflicts {
        match (&conflict.key, conflict.is_line_addressable()) {
            (Some(key), _) => eprintln!("  at {key}"),
            (None, true) => eprintln!("  lines {}-{}", conflict.start_line, conflict.end_line),
            (None, false) => eprintln!("  (unlocated)"),
        }
    }
    if conflict_file {
        let original = output.unwrap_or(path);
        let written = write_conflict_file(original, &result.content, &result.conflicts)?;
        eprintln!("Conflict file: {}", written.display());
    }
    Ok(ExitCode::from(1))
}

async fn cmd_diff(a: &Path, b: &Path, path: Option<&str>) -> anyhow::Result<ExitCode> {
    let old = tokio::fs::read(a).await?;
    let new = tokio::fs::read(b).await?;
    let label = path.map(str::to_string).unwrap_or_else(|| a.display().to_string());
    print!(
        "{}",
        unified_diff(
            &label,
            &String::from_utf8_lossy(&old),
            &String::from_utf8_lossy(&new),
        )
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_strategy(settings: &Settings, paths: &[PathBuf]) -> anyhow::Result<ExitCode> {
    let selector = ConfiguredSelector::new(settings.merge.overrides.clone());
    for path in paths {
        println!("{}\t{}", selector.select_strategy(path), path.display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_batch(settings: &Settings, manifest_path: &Path, yes: bool, json: bool) -> anyhow::Result<ExitCode> {
    let manifest = Manifest::load(manifest_path).await?;
    let engine = build_engine(settings);

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing current file");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let report = run_batch(&engine, &manifest, &cancel).await?;
    if json {
        let reviews: Vec<_> = report.items.iter().map(|i| &i.review).collect();
        println!("{}", serde_json::to_string_pretty(&reviews)?);
    } else {
        print_review(&report);
    }

    if report.cancelled {
        eprintln!("Cancelled; nothing written.");
        return Ok(ExitCode::from(130));
    }
    if report.items.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let confirmed = yes
        || settings.merge.assume_yes
        || dialoguer::Confirm::new()
            .with_prompt(format!("Write {} merged file(s)?", report.items.len()))
            .default(false)
            .interact()?;
    if !confirmed {
        println!("Aborted; nothing written.");
        return Ok(ExitCode::SUCCESS);
    }

    let written = write_outputs(&report, settings.merge.write_conflict_files).await?;
    for path in &written {
        println!("  wrote {}", path.display());
    }
    tracing::info!(files = written.len(), "batch written");

    if report.conflict_count() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_review(report: &BatchReport) {
    println!();
    println!("{:<8} {:<14} {:<10} PATH", "RISK", "STRATEGY", "CONFLICTS");
    for item in &report.items {
        let review = &item.review;
        println!(
            "{:<8} {:<14} {:<10} {} ({})",
            review.risk.as_str(),
            review.strategy.as_str(),
            review.conflict_count,
            review.path.display(),
            review.summary
        );
    }
    let elapsed = report.finished_at - report.started_at;
    println!();
    println!(
        "{} file(s), {} conflict(s), {}ms",
        report.items.len(),
        report.conflict_count(),
        elapsed.num_milliseconds()
    );
}

fn cmd_init(cli: &Cli) -> anyhow::Result<ExitCode> {
    let path = settings_path(cli);
    if path.exists() {
        let overwrite = dialoguer::Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            return Ok(ExitCode::SUCCESS);
        }
    }
    Settings::default().save(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(ExitCode::SUCCESS)
}
