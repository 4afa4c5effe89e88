//! Progress UI (spinner) for detached extraction runs.

use std::sync::Arc;
use std::time::Duration;

use extractor_core::job::Dispatcher;
use extractor_core::{Job, JobState};
use indicatif::{ProgressBar, ProgressStyle};

/// How often the poll loop reads the job record.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Polls a submitted job until it reaches a terminal state, driving a
/// spinner with page and item counters along the way.
///
/// Returns the final job snapshot, or `None` if the record disappeared
/// (expired or never existed).
pub(crate) async fn poll_until_terminal(
    dispatcher: &Arc<Dispatcher>,
    id: &str,
    use_spinner: bool,
) -> Option<Job> {
    let spinner = use_spinner.then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    loop {
        let Some(job) = dispatcher.poll(id) else {
            if let Some(spinner) = &spinner {
                spinner.finish_and_clear();
            }
            return None;
        };

        if job.is_terminal() {
            if let Some(spinner) = &spinner {
                spinner.finish_and_clear();
            }
            return Some(job);
        }

        if let Some(spinner) = &spinner {
            spinner.set_message(describe(&job));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn describe(job: &Job) -> String {
    match job.state {
        JobState::Pending => "Waiting for a worker...".to_string(),
        _ if job.total_pages > 0 => format!(
            "[page {}/{}] {} posts extracted...",
            job.current_page, job.total_pages, job.processed_items
        ),
        _ => format!(
            "[page {}] {} posts extracted...",
            job.current_page, job.processed_items
        ),
    }
}
