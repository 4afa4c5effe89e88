//! CLI entry point for the extractor tool.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use extractor_core::job::{DEFAULT_JOB_TIME_LIMIT, DEFAULT_WORKERS, Dispatcher, Ledger};
use extractor_core::{
    ExtractionDriver, ExtractionRequest, HttpFetcher, JobState, RetryPolicy, parse_after_date,
};
use tracing::{debug, info};

mod cli;
mod progress;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let after = args
        .after
        .as_deref()
        .map(parse_after_date)
        .transpose()
        .context("invalid --after date")?;

    let request = ExtractionRequest::new(&args.base_url, &args.post_type, after)
        .context("invalid extraction request")?;

    let driver = ExtractionDriver::new(
        RetryPolicy::with_max_attempts(args.max_attempts),
        args.per_page,
    );
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(HttpFetcher::new()),
        Arc::new(Ledger::default()),
        driver,
        DEFAULT_WORKERS,
        DEFAULT_JOB_TIME_LIMIT,
    )?);

    if args.detach {
        run_detached(&dispatcher, request, args.quiet).await
    } else {
        run_inline(&dispatcher, &request, Duration::from_secs(args.timeout)).await
    }
}

/// Runs the extraction inline and prints the outcome as JSON.
async fn run_inline(
    dispatcher: &Arc<Dispatcher>,
    request: &ExtractionRequest,
    timeout: Duration,
) -> Result<()> {
    info!(post_type = request.post_type(), "extracting synchronously");

    let outcome = match dispatcher.run_sync(request, timeout).await {
        Ok(outcome) => outcome,
        Err(e) => bail!("{e} (re-run with --detach)"),
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.is_completed() {
        bail!(
            "extraction failed: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    info!(total_posts = outcome.total_posts, "extraction complete");
    Ok(())
}

/// Submits the extraction as a background job, polls it to completion with
/// a progress spinner, and prints the final job record as JSON.
async fn run_detached(
    dispatcher: &Arc<Dispatcher>,
    request: ExtractionRequest,
    quiet: bool,
) -> Result<()> {
    let id = dispatcher.submit(request);
    info!(id, "job submitted");

    let use_spinner = !quiet && std::io::stderr().is_terminal();
    let Some(job) = progress::poll_until_terminal(dispatcher, &id, use_spinner).await else {
        bail!("job {id} disappeared before finishing");
    };

    println!("{}", serde_json::to_string_pretty(&job)?);

    if job.state == JobState::Failure {
        bail!(
            "job {id} failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        );
    }

    info!(id, processed_items = job.processed_items, "job complete");
    Ok(())
}
