use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use codegraph_core::{CodeGraphError, NeverCancelled, Phase, PipelineConfig, ProgressSink};
use codegraph_graph::CsvStorageWriter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

#[derive(Parser)]
#[command(name = "codegraph")]
#[command(about = "CodeGraph ingestion pipeline CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a repository and build its CodeGraph index under `<path>/.codegraph/`
    Analyze {
        /// Repository root to index (defaults to the current directory)
        path: Option<PathBuf>,
    },

    /// Serve the graph over the Model Context Protocol
    Mcp,

    /// Interactive first-run setup
    Setup,

    /// Generate a wiki-style documentation site from an index
    Wiki,
}

/// Drives an indicatif bar per pipeline phase, matching the teacher's
/// `IndexingProgress` style strings but one bar per phase instead of a
/// shared `MultiProgress`, since this driver reports coarse percentages
/// rather than per-item ticks.
struct CliProgress {
    bar: Mutex<Option<(Phase, ProgressBar)>>,
}

impl CliProgress {
    fn new() -> Self {
        Self { bar: Mutex::new(None) }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl ProgressSink for CliProgress {
    fn report(&self, phase: Phase, percent: u8, detail: Option<&str>) {
        let mut guard = self.bar.lock().unwrap();
        if guard.as_ref().map(|(p, _)| *p) != Some(phase) {
            if let Some((_, old)) = guard.take() {
                old.finish_and_clear();
            }
            let bar = ProgressBar::new(100);
            bar.set_style(Self::style());
            bar.set_message(phase.label().to_string());
            *guard = Some((phase, bar));
        }
        if let Some((_, bar)) = guard.as_ref() {
            bar.set_position(percent as u64);
            if let Some(detail) = detail {
                bar.set_message(format!("{} — {}", phase.label(), detail));
            }
            if percent >= 100 {
                bar.finish_and_clear();
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Exit code for a `CodeGraphError`, per §6: 0 success, 1 for the
/// user-actionable "wrong place to run this" class, 2 for anything else.
fn exit_code_for(error: &CodeGraphError) -> i32 {
    match error {
        CodeGraphError::NotARepository(_) | CodeGraphError::NoIndex(_) | CodeGraphError::StaleIndex(_) => 1,
        _ => 2,
    }
}

async fn run_analyze(path: Option<PathBuf>) -> i32 {
    let root = path.unwrap_or_else(|| PathBuf::from("."));
    let root = match root.canonicalize() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{} {}: {}", "Error:".red().bold(), root.display(), e);
            return 1;
        }
    };

    info!("analyzing repository at {:?}", root);
    let config = match PipelineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return exit_code_for(&e);
        }
    };

    let storage_root = root.join(".codegraph");
    let mut writer = match CsvStorageWriter::new(storage_root.clone()) {
        Ok(writer) => writer,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return exit_code_for(&e);
        }
    };

    let progress = CliProgress::new();
    let result = codegraph_graph::run(&root, &config, &progress, &NeverCancelled, &mut writer).await;

    match result {
        Ok(report) => {
            println!();
            println!("{}", "CodeGraph analysis complete".green().bold());
            println!("  {:<22} {}", "files walked:".bold(), report.total_file_count);
            println!("  {:<22} {}", "files failed:".bold(), report.failed_files.len());
            println!("  {:<22} {}", "nodes:".bold(), report.node_count);
            println!("  {:<22} {}", "relationships:".bold(), report.relationship_count);
            println!("  {:<22} {}", "communities:".bold(), report.community_count);
            println!("  {:<22} {}", "processes:".bold(), report.process_count);
            println!("  {:<22} {}", "index:".bold(), storage_root.display());
            if !report.failed_files.is_empty() {
                println!();
                println!("{}", "Files skipped:".yellow().bold());
                for (file, reason) in &report.failed_files {
                    println!("  {} — {}", file.yellow(), reason);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            exit_code_for(&e)
        }
    }
}

fn run_stub(name: &str) -> i32 {
    println!(
        "{} {} is not implemented in this build — see DESIGN.md",
        "codegraph".bold(),
        name
    );
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Analyze { path } => run_analyze(path).await,
        Commands::Mcp => run_stub("mcp"),
        Commands::Setup => run_stub("setup"),
        Commands::Wiki => run_stub("wiki"),
    };

    std::process::exit(code);
}
