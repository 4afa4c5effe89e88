//! CLI argument definitions using clap derive macros.

use clap::Parser;

use extractor_core::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PER_PAGE};

/// Extract and normalize WordPress content through the REST API.
///
/// Fetches every published post of the given type from a site and prints
/// the normalized items as JSON. Small sites run synchronously; pass
/// `--detach` for large sites to run on a worker with progress reporting.
#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(author, version, about)]
pub struct Args {
    /// Site origin, e.g. https://example.com
    pub base_url: String,

    /// Resource collection to extract (e.g. posts, pages)
    pub post_type: String,

    /// Only include posts published on or after this date
    /// (ISO-8601, e.g. 2024-01-31 or 2024-01-31T12:00:00)
    #[arg(short = 'a', long)]
    pub after: Option<String>,

    /// Run as a background job with progress reporting instead of inline
    #[arg(short, long)]
    pub detach: bool,

    /// Timeout for the synchronous path in seconds (1-3600)
    #[arg(short = 't', long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Records requested per page (1-100)
    #[arg(short = 'p', long, default_value_t = DEFAULT_PER_PAGE, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub per_page: u32,

    /// Maximum attempts per page for transient failures (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
