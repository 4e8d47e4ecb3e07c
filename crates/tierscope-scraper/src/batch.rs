//! Sequential run over a list of Targets with periodic session restarts.

use std::time::{Duration, Instant};

use tierscope_core::{AppConfig, ExtractionRecord, SelectorSet};

use crate::driver::{Driver, SessionFactory};
use crate::error::ScrapeError;
use crate::locate::Page;
use crate::retry::retry_with_backoff;
use crate::session::{scrape_target, Outcome, SessionOptions, SkipReason};
use crate::timing::Timing;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Tear down and reopen the browser after this many Targets.
    pub restart_every: usize,
    pub delay_min: Duration,
    pub delay_max: Duration,
    pub max_targets: Option<usize>,
    pub target_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub session: SessionOptions,
}

impl BatchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            restart_every: config.restart_every,
            delay_min: Duration::from_millis(config.delay_min_ms),
            delay_max: Duration::from_millis(config.delay_max_ms),
            max_targets: config.max_targets,
            target_retries: config.target_retries,
            retry_backoff_base_secs: config.retry_backoff_base_secs,
            session: SessionOptions {
                failure_policy: config.failure_policy,
                skip_without_patrons: config.skip_without_patrons,
                target_timeout: Duration::from_secs(config.target_timeout_secs),
            },
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            restart_every: 10,
            delay_min: Duration::from_secs(5),
            delay_max: Duration::from_secs(10),
            max_targets: None,
            target_retries: 0,
            retry_backoff_base_secs: 5,
            session: SessionOptions::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<ExtractionRecord>,
    pub skipped: Vec<(String, SkipReason)>,
    pub attempted: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }
}

/// Random pause between Targets, inclusive of both bounds.
fn inter_target_delay(min: Duration, max: Duration) -> Duration {
    let min_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rand::random_range(min_ms..=max_ms))
}

async fn close_session<D: Driver>(driver: D) {
    if let Err(e) = driver.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}

/// Scrape every Target in order.
///
/// Skipped Targets are logged and recorded in the report; the batch always
/// runs to the end.
///
/// # Errors
///
/// Returns [`ScrapeError::SessionStart`] only if the very first browser
/// session cannot be opened. A later restart failure ends the batch early
/// with what was gathered so far.
pub async fn run_batch<F: SessionFactory>(
    factory: &F,
    targets: &[String],
    selectors: &SelectorSet,
    timing: &Timing,
    options: &BatchOptions,
) -> Result<BatchReport, ScrapeError> {
    let started = Instant::now();
    let targets = match options.max_targets {
        Some(cap) if cap < targets.len() => &targets[..cap],
        _ => targets,
    };
    let restart_every = options.restart_every.max(1);
    let mut report = BatchReport::default();
    let mut session: Option<F::Driver> = None;

    tracing::info!(targets = targets.len(), "batch started");

    for (index, url) in targets.iter().enumerate() {
        if index > 0 && index % restart_every == 0 {
            if let Some(driver) = session.take() {
                tracing::info!(after = index, "restarting browser session");
                close_session(driver).await;
            }
        }

        if session.is_none() {
            match factory.open().await {
                Ok(driver) => session = Some(driver),
                Err(e) if index == 0 => return Err(ScrapeError::SessionStart(e.to_string())),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        remaining = targets.len() - index,
                        "cannot reopen browser; stopping batch"
                    );
                    break;
                }
            }
        }
        let Some(driver) = session.as_ref() else {
            break;
        };

        tracing::info!(url = %url, n = index + 1, of = targets.len(), "scraping target");
        report.attempted += 1;
        let page = Page::new(driver, selectors, timing);
        let page = &page;
        let session_options = &options.session;
        let outcome = retry_with_backoff(
            options.target_retries,
            options.retry_backoff_base_secs,
            move || scrape_target(page, url, session_options),
        )
        .await;

        match outcome {
            Outcome::Success(record) => report.records.push(record),
            Outcome::Skipped(reason) => {
                tracing::warn!(url = %url, reason = %reason, "target skipped");
                if let SkipReason::SessionLost(_) = reason {
                    if let Some(driver) = session.take() {
                        close_session(driver).await;
                    }
                }
                report.skipped.push((url.clone(), reason));
            }
        }

        if index + 1 < targets.len() {
            let delay = inter_target_delay(options.delay_min, options.delay_max);
            tracing::debug!(delay_ms = delay.as_millis(), "pausing before next target");
            tokio::time::sleep(delay).await;
        }
    }

    if let Some(driver) = session.take() {
        close_session(driver).await;
    }

    report.elapsed = started.elapsed();
    tracing::info!(
        attempted = report.attempted,
        succeeded = report.succeeded(),
        skipped = report.skipped.len(),
        elapsed_secs = report.elapsed.as_secs(),
        "batch finished"
    );
    Ok(report)
}
