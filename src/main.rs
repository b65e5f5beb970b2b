//! cdn-mirror main entry point
//!
//! This is the command-line interface for the recursive CDN directory mirror.

use cdn_mirror::config::{load_config_or_default, validate, Config};
use cdn_mirror::crawler::{run_mirror, HttpFetcher};
use cdn_mirror::output::print_report;
use cdn_mirror::url::validate_base_url;
use cdn_mirror::MirrorError;
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// cdn-mirror: Recursively mirror a CDN directory listing
///
/// cdn-mirror crawls the directory-listing pages under BASE_URL, downloads
/// every file it finds into DEST_DIR with bounded concurrency and retries,
/// and skips files that already exist locally so interrupted runs resume.
#[derive(Parser, Debug)]
#[command(name = "cdn-mirror")]
#[command(version)]
#[command(about = "Recursively mirror a CDN directory listing", long_about = None)]
#[command(after_help = "Example: cdn-mirror 'https://cdn.jsdelivr.net/npm/brython@3/' ./src/lib/brython/")]
struct Cli {
    /// Directory listing URL to mirror (http or https)
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Local directory the tree is mirrored into
    #[arg(value_name = "DEST_DIR")]
    dest_dir: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of simultaneous downloads (overrides the config file)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Validate the URL before any other work
    if let Err(e) = validate_base_url(&cli.base_url) {
        tracing::error!("✗ Invalid URL: {}", e);
        return ExitCode::FAILURE;
    }

    let (config, fetcher) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match run_mirror(&cli.base_url, &cli.dest_dir, &config, fetcher, cancel).await {
        Ok(report) => {
            if !cli.quiet {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("✗ Error during download: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cdn_mirror=info,warn"),
            1 => EnvFilter::new("cdn_mirror=debug,info"),
            2 => EnvFilter::new("cdn_mirror=trace,debug"),
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

/// Loads the settings and builds the HTTP fetcher
fn prepare(cli: &Cli) -> Result<(Config, Arc<HttpFetcher>), MirrorError> {
    let config = load_settings(cli)?;
    let fetcher = HttpFetcher::new(&config.fetch)?;
    Ok((config, Arc::new(fetcher)))
}

/// Loads the config file (if any) and applies command-line overrides
fn load_settings(cli: &Cli) -> Result<Config, cdn_mirror::ConfigError> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let mut config = load_config_or_default(cli.config.as_deref())?;

    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrency = concurrency;
        validate(&config)?;
    }

    tracing::debug!(
        "Concurrency: {}, listing timeout: {}s, download timeout: {}s, attempts: {}",
        config.crawler.max_concurrency,
        config.fetch.listing_timeout_secs,
        config.fetch.download_timeout_secs,
        config.retry.max_attempts
    );

    Ok(config)
}

/// Cancels `cancel` on the first Ctrl-C and exits on the second
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if handle_interrupts(tokio::signal::ctrl_c, cancel).await {
            tracing::error!("✗ Second interrupt, exiting without waiting for downloads");
            std::process::exit(130);
        }
    });
}

/// Waits for interrupts from `next_interrupt`
///
/// The first one cancels the crawl. Returns true once a second one arrives,
/// false if listening for interrupts fails.
async fn handle_interrupts<F, Fut>(mut next_interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    tracing::warn!("Interrupt received, finishing in-flight downloads (Ctrl-C again to quit)");
    cancel.cancel();

    next_interrupt().await.is_ok()
}
