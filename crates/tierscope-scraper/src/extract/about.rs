use std::sync::LazyLock;

use tierscope_core::{AboutMetrics, Locator};

use crate::driver::{Driver, ScrollTarget};
use crate::error::DriverError;
use crate::locate::Page;
use crate::normalize::{parse_member_number, word_count};

static ANY_CHILD: LazyLock<Locator> = LazyLock::new(|| Locator::css("*"));

/// Member counts and description length from the about page.
///
/// Always navigates back to `origin` afterward.
///
/// # Errors
///
/// Only session-level driver failures while returning to `origin`.
pub async fn extract_about<D: Driver>(
    page: &Page<'_, D>,
    origin: &str,
) -> Result<AboutMetrics, DriverError> {
    let metrics = read_about(page).await;
    page.return_to(origin).await?;
    Ok(metrics)
}

async fn read_about<D: Driver>(page: &Page<'_, D>) -> AboutMetrics {
    let sel = page.selectors;
    let timing = page.timing;
    let mut metrics = AboutMetrics::default();

    page.scroll_to(ScrollTarget::Top).await;
    if !page.click(&sel.about_link, timing.click).await {
        tracing::debug!("about link not clickable");
        return metrics;
    }
    let blocks = [
        &sel.about_total_members,
        &sel.about_paid_members,
        &sel.about_content,
    ];
    if page.find_any(&blocks, timing.section).await.is_none() {
        tracing::warn!("about page did not load");
        return metrics;
    }

    metrics.total_members = member_count(page, &sel.about_total_members).await;
    metrics.paid_members = member_count(page, &sel.about_paid_members).await;
    metrics.word_count = page
        .text_of(&sel.about_content, None, timing.control_probe)
        .await
        .map_or(0, |t| word_count(&t));

    tracing::info!(
        total_members = ?metrics.total_members,
        paid_members = ?metrics.paid_members,
        words = metrics.word_count,
        "about page"
    );
    metrics
}

/// First leaf under the block whose text is a bare number.
async fn member_count<D: Driver>(page: &Page<'_, D>, block: &Locator) -> Option<u64> {
    let container = page.find(block, None, page.timing.control_probe).await?;
    let candidates = page
        .find_all_within(&page.selectors.member_number, Some(&container), page.timing.probe)
        .await;
    for candidate in &candidates {
        if !is_leaf(page, candidate).await {
            continue;
        }
        if let Some(n) = page.text(candidate).await.and_then(|t| parse_member_number(&t)) {
            return Some(n);
        }
    }
    None
}

/// Wrappers carry their children's text, so only childless elements count.
async fn is_leaf<D: Driver>(page: &Page<'_, D>, element: &D::Element) -> bool {
    matches!(
        page.driver.find_all(&ANY_CHILD, Some(element)).await,
        Ok(children) if children.is_empty()
    )
}
