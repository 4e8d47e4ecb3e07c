//! One Target from page load to finished record.

use std::fmt;
use std::time::Duration;

use tierscope_core::{ExtractionRecord, FailurePolicy};

use crate::driver::{Driver, ScrollTarget};
use crate::error::{DriverError, ScrapeError};
use crate::extract;
use crate::locate::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The creator name never appeared after navigation.
    LandmarkMissing,
    /// Header patron count read 0 and such Targets are configured out.
    NoPatrons,
    Navigation(String),
    Timeout,
    SessionLost(String),
    Failed(String),
}

impl SkipReason {
    /// Whether trying the same Target again could succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            SkipReason::LandmarkMissing | SkipReason::Navigation(_) | SkipReason::Timeout
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LandmarkMissing => f.write_str("profile landmark never appeared"),
            SkipReason::NoPatrons => f.write_str("no patrons"),
            SkipReason::Navigation(reason) => write!(f, "navigation failed: {reason}"),
            SkipReason::Timeout => f.write_str("time budget exceeded"),
            SkipReason::SessionLost(reason) => write!(f, "browser session lost: {reason}"),
            SkipReason::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ExtractionRecord),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub failure_policy: FailurePolicy,
    pub skip_without_patrons: bool,
    pub target_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Drop,
            skip_without_patrons: false,
            target_timeout: Duration::from_secs(600),
        }
    }
}

/// Record under construction plus how far orchestration got.
#[derive(Debug)]
struct Progress {
    record: ExtractionRecord,
    landmark_seen: bool,
}

/// Scrape one Target.
///
/// A page whose landmark never appears is always skipped. A failure after
/// that point either drops the Target or keeps the partially filled record,
/// per [`SessionOptions::failure_policy`].
pub async fn scrape_target<D: Driver>(
    page: &Page<'_, D>,
    url: &str,
    options: &SessionOptions,
) -> Outcome {
    let mut progress = Progress {
        record: ExtractionRecord::new(url),
        landmark_seen: false,
    };

    let result = tokio::time::timeout(
        options.target_timeout,
        orchestrate(page, url, options, &mut progress),
    )
    .await;

    let failure = match result {
        Ok(Ok(None)) => {
            tracing::info!(url = %url, creator = %progress.record.creator_name, "target scraped");
            return Outcome::Success(progress.record);
        }
        Ok(Ok(Some(reason))) => return Outcome::Skipped(reason),
        Ok(Err(ScrapeError::Driver(DriverError::SessionLost(reason)))) => {
            return Outcome::Skipped(SkipReason::SessionLost(reason));
        }
        Ok(Err(err)) => {
            tracing::warn!(url = %url, error = %err, "target failed mid-extraction");
            SkipReason::Failed(err.to_string())
        }
        Err(_) => {
            let err = ScrapeError::TargetTimeout {
                secs: options.target_timeout.as_secs(),
            };
            tracing::warn!(url = %url, error = %err, "target timed out");
            SkipReason::Timeout
        }
    };

    if progress.landmark_seen && options.failure_policy == FailurePolicy::DefaultRow {
        tracing::info!(url = %url, reason = %failure, "keeping partial record");
        Outcome::Success(progress.record)
    } else {
        Outcome::Skipped(failure)
    }
}

/// Runs every extractor in order. `Ok(Some(reason))` is a deliberate skip.
async fn orchestrate<D: Driver>(
    page: &Page<'_, D>,
    url: &str,
    options: &SessionOptions,
    progress: &mut Progress,
) -> Result<Option<SkipReason>, ScrapeError> {
    match page.driver.navigate(url).await {
        Ok(()) => {}
        Err(DriverError::Navigation { reason, .. }) => {
            return Ok(Some(SkipReason::Navigation(reason)));
        }
        Err(DriverError::Http(e)) => return Ok(Some(SkipReason::Navigation(e.to_string()))),
        Err(e) => return Err(e.into()),
    }

    let Some(name) = extract::read_creator_name(page, page.timing.landmark).await else {
        tracing::warn!(url = %url, "profile landmark missing");
        return Ok(Some(SkipReason::LandmarkMissing));
    };
    progress.landmark_seen = true;
    progress.record.creator_name = name;
    tracing::info!(url = %url, creator = %progress.record.creator_name, "profile loaded");

    extract::dismiss_age_gate(page).await;
    page.scroll_to(ScrollTarget::Top).await;

    let record = &mut progress.record;
    record.counters = extract::extract_counters(page).await;
    if options.skip_without_patrons && record.counters.patrons.unwrap_or(0) == 0 {
        tracing::info!(url = %url, "no patrons; skipping");
        return Ok(Some(SkipReason::NoPatrons));
    }

    record.tiers = extract::extract_tiers(page).await;
    page.return_to(url).await?;

    record.breakdowns = extract::extract_breakdowns(page).await;
    record.engagement = extract::extract_engagement(page).await;

    record.chat = extract::extract_chat(page).await;
    page.return_to(url).await?;

    record.about = extract::extract_about(page, url).await?;

    record.social.platforms = extract::extract_social(page, url).await;
    page.return_to(url).await?;
    record.social.total_links = extract::count_external_links(page, url).await;

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture;

    #[test]
    fn retriable_reasons() {
        assert!(SkipReason::LandmarkMissing.is_retriable());
        assert!(SkipReason::Timeout.is_retriable());
        assert!(SkipReason::Navigation("HTTP 502".into()).is_retriable());
        assert!(!SkipReason::NoPatrons.is_retriable());
        assert!(!SkipReason::Failed("boom".into()).is_retriable());
        assert!(!SkipReason::SessionLost("gone".into()).is_retriable());
    }

    #[tokio::test]
    async fn missing_landmark_skips_regardless_of_policy() {
        let fx = fixture::load("<html><body><p>Loading...</p></body></html>", &[]).await;
        let options = SessionOptions {
            failure_policy: FailurePolicy::DefaultRow,
            ..SessionOptions::default()
        };
        let outcome = scrape_target(&fx.page(), fixture::URL, &options).await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::LandmarkMissing));
    }

    #[tokio::test]
    async fn zero_patrons_skipped_when_configured() {
        let html = r#"<html><body>
            <h1 data-tag="creator-name">Alice</h1>
            <ul><li><span data-tag="patron-count">0 patrons</span></li></ul>
            </body></html>"#;
        let fx = fixture::load(html, &[]).await;
        let options = SessionOptions {
            skip_without_patrons: true,
            ..SessionOptions::default()
        };
        let outcome = scrape_target(&fx.page(), fixture::URL, &options).await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::NoPatrons));

        let outcome = scrape_target(&fx.page(), fixture::URL, &SessionOptions::default()).await;
        assert!(matches!(outcome, Outcome::Success(ref r) if r.creator_name == "Alice"));
    }
}
