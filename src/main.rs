//! CRM-Harvest main entry point
//!
//! This is the command-line interface for the CRM-Harvest bulk record fetcher.

use anyhow::Context;
use clap::Parser;
use crm_harvest::config::{load_config_with_hash, validate, Config, RangeConfig, SinkFormat};
use crm_harvest::fetcher::RunController;
use crm_harvest::output::{print_report, ProgressDisplay};
use crm_harvest::RunState;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// CRM-Harvest: fetch a numbered range of records from an HTTP endpoint
///
/// Every identifier in `--start..=--end` is requested as `{base-url}/{id}`.
/// Successful payloads are stored individually and a JSON summary of the run
/// is written to the output directory, also when the run is interrupted.
#[derive(Parser, Debug)]
#[command(name = "crm-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Fetch a numbered range of records from an HTTP endpoint", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Start ID (default: 1000)
    #[arg(long)]
    start: Option<u64>,

    /// End ID, inclusive (default: 70000)
    #[arg(long)]
    end: Option<u64>,

    /// Output directory (default: crm_data)
    #[arg(long, value_name = "DIR")]
    output: Option<String>,

    /// Delay between requests in seconds (default: 0.1)
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Do not save individual records
    #[arg(long)]
    no_save: bool,

    /// Endpoint records are fetched from; ids are appended as `/{id}`
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Number of parallel workers (default: 4)
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Record storage backend
    #[arg(long, value_enum)]
    format: Option<SinkFormat>,

    /// Validate the configuration and print the plan without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Layers command-line flags over the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start) = self.start {
            config.range.start = start;
        }
        if let Some(end) = self.end {
            config.range.end = end;
        }
        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
        if let Some(delay) = self.delay {
            config.fetch.delay_secs = delay;
        }
        if self.no_save {
            config.output.save_records = false;
        }
        if let Some(base_url) = &self.base_url {
            config.fetch.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.fetch.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.concurrency = concurrency;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crm_harvest=info,warn"),
            1 => EnvFilter::new("crm_harvest=debug,info"),
            2 => EnvFilter::new("crm_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        print_plan(&config);
        return Ok(ExitCode::SUCCESS);
    }

    handle_harvest(config, cli.quiet).await
}

/// Handles the --dry-run mode: shows what would be fetched
fn print_plan(config: &Config) {
    let RangeConfig { start, end } = config.range;

    println!("=== CRM-Harvest Dry Run ===\n");
    println!("Range: {} to {} ({} records)", start, end, config.range.len());
    println!("URL template: {}/{{id}}", config.fetch.base_url.trim_end_matches('/'));
    println!("User agent: {}", config.fetch.user_agent);
    println!("Timeout: {}s", config.fetch.timeout_secs);
    println!("Delay: {}s", config.fetch.delay_secs);
    println!("Concurrency: {}", config.fetch.concurrency);
    println!("Output directory: {}", config.output.directory);
    if config.output.save_records {
        println!("Records: {:?}", config.output.format);
    } else {
        println!("Records: not saved");
    }
    println!("Summary: {}", config.output.summary_path().display());
    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let mut controller =
        RunController::from_config(&config).context("Failed to initialize harvest")?;

    if !quiet {
        println!("Starting data retrieval from {}", config.fetch.base_url);
        println!(
            "Range: {} to {} ({} records)",
            config.range.start,
            config.range.end,
            config.range.len()
        );
        println!("Output directory: {}", config.output.directory);
        println!("{}", "-".repeat(80));
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        let force_stop = controller.force_stop_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::warn!(
                "Interrupt received, stopping dispatch (press Ctrl-C again to abandon pending requests)"
            );
            cancel.cancel();

            // A second interrupt skips the grace period; the summary is still written
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Second interrupt received, abandoning pending requests");
                force_stop.cancel();
            }
        });
    }

    let display =
        (!quiet).then(|| ProgressDisplay::spawn(controller.subscribe(), config.range.len()));
    let result = controller.run(cancel).await;
    if let Some(display) = display {
        display.finish();
    }

    let report = result.context("Harvest failed")?;
    if !quiet {
        print_report(&report);
    }

    if report.state == RunState::Interrupted {
        if !quiet {
            println!("Partial results saved to {}/", config.output.directory);
        }
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
