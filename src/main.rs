use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use iocscan::{
    bulk::{run_bulk, BulkOptions},
    cache::Cache,
    config::Config,
    ioc,
    model::{ScanResult, Severity},
    output::{format_result_to_string, print_result, OutputFormat},
    scanner::{run_scan, ScanOptions},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FINDINGS: u8 = 1;
    pub const ERROR: u8 = 2;
}

#[derive(Parser)]
#[command(name = "iocscan")]
#[command(
    author,
    version,
    about = "Scan npm projects for dependencies on known-compromised package versions"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one project tree
    Scan {
        /// Project directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format (table, json, sarif)
        #[arg(short, long)]
        format: Option<String>,

        /// Shorthand for --format json
        #[arg(long, conflicts_with = "format")]
        json: bool,

        /// IoC CSV source: an http(s) URL or a local file
        #[arg(long)]
        csv_url: Option<String>,

        /// Only scan lockfiles, skip package.json
        #[arg(long)]
        lockfile_only: bool,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with code 1 if findings at or above this severity are found
        #[arg(long, value_enum, default_value_t = FailLevel::Potential)]
        fail_on: FailLevel,

        /// Always download the IoC list, bypassing the cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Scan every project listed in a paths file
    Bulk {
        /// File with one project path per line
        paths_file: PathBuf,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Base directory for results
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// IoC CSV source: an http(s) URL or a local file
        #[arg(long)]
        csv_url: Option<String>,

        /// Only scan lockfiles, skip package.json
        #[arg(long)]
        lockfile_only: bool,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the cached IoC list
    ClearCache,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FailLevel {
    Direct,
    Transitive,
    Potential,
}

impl FailLevel {
    fn severity(self) -> Severity {
        match self {
            FailLevel::Direct => Severity::Direct,
            FailLevel::Transitive => Severity::Transitive,
            FailLevel::Potential => Severity::Potential,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    });

    match cli.command {
        Commands::Scan {
            path,
            format,
            json,
            csv_url,
            lockfile_only,
            output,
            fail_on,
            no_cache,
        } => {
            let format = if json {
                OutputFormat::Json
            } else {
                let name = format.unwrap_or_else(|| config.default_format.clone());
                OutputFormat::from_str(&name).map_err(|e| anyhow::anyhow!(e))?
            };

            let mut options = ScanOptions::from_config(&config);
            options.lockfile_only |= lockfile_only;
            let source = csv_url.unwrap_or_else(|| config.ioc_url.clone());
            let cache = (!no_cache).then(|| Cache::with_ttl_hours(config.cache_ttl_hours));

            scan(&path, &source, &options, cache, format, output, fail_on).await
        }
        Commands::Bulk {
            paths_file,
            workers,
            output_dir,
            csv_url,
            lockfile_only,
        } => {
            let mut scan_options = ScanOptions::from_config(&config);
            scan_options.lockfile_only |= lockfile_only;

            let options = BulkOptions {
                paths_file,
                output_dir: output_dir.unwrap_or_else(|| config.output_dir.clone()),
                workers: workers.unwrap_or(config.workers),
                scan: scan_options,
                show_progress: true,
            };
            let source = csv_url.unwrap_or_else(|| config.ioc_url.clone());
            let cache = Cache::with_ttl_hours(config.cache_ttl_hours);

            bulk(&options, &source, cache).await
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let cache = Cache::new();
            cache.clear()?;
            println!("Cache cleared: {}", cache.dir().display());
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn scan(
    path: &std::path::Path,
    source: &str,
    options: &ScanOptions,
    cache: Option<Cache>,
    format: OutputFormat,
    output_file: Option<PathBuf>,
    fail_on: FailLevel,
) -> Result<u8> {
    let is_interactive = format == OutputFormat::Table;

    let progress = is_interactive.then(|| spinner("Loading IoC list and scanning..."));
    let result = run_scan(path, source, options, cache).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = result?;

    match output_file {
        Some(file) => {
            std::fs::write(&file, format_result_to_string(&result, format)?)?;
            if is_interactive {
                println!("Results written to: {}", file.display());
            }
        }
        None => print_result(&result, format)?,
    }

    Ok(determine_exit_code(&result, fail_on))
}

async fn bulk(options: &BulkOptions, source: &str, cache: Cache) -> Result<u8> {
    let table = Arc::new(ioc::load_table(source, Some(cache)).await?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, waiting for running scans to finish...");
            on_interrupt.cancel();
        }
    });

    println!(
        "Scanning {} with {} workers...",
        options.paths_file.display(),
        options.workers.max(1)
    );
    let report = run_bulk(options, table, cancel).await?;
    let summary = &report.summary;

    println!();
    println!("=== Bulk Scan {} ===", if summary.cancelled { "Cancelled" } else { "Complete" });
    println!("Duration: {}", summary.duration);
    println!(
        "Paths scanned: {}/{}",
        summary.path_results.len(),
        summary.total_paths
    );
    println!("Successful: {}", summary.successful_scans);
    println!("Failed: {}", summary.failed_scans);
    println!("Total findings: {}", summary.total_findings);
    println!("Results: {}", report.results_dir.display());

    if summary.cancelled {
        Ok(exit_codes::ERROR)
    } else if summary.total_findings > 0 {
        Ok(exit_codes::FINDINGS)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

/// Returns `FINDINGS` when any finding is at least as severe as `fail_on`.
fn determine_exit_code(result: &ScanResult, fail_on: FailLevel) -> u8 {
    let threshold = fail_on.severity().rank();
    match result.worst_severity() {
        Some(worst) if worst.rank() >= threshold => exit_codes::FINDINGS,
        _ => exit_codes::SUCCESS,
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'iocscan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
