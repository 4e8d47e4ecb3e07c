use std::time::Duration;

use tierscope_core::{Counters, Locator};

use crate::driver::Driver;
use crate::locate::Page;
use crate::normalize::{has_digit, parse_scaled_count, parse_scaled_number};

/// The creator's display name. Doubles as the page-loaded landmark.
pub async fn read_creator_name<D: Driver>(page: &Page<'_, D>, timeout: Duration) -> Option<String> {
    page.text_of(&page.selectors.creator_name, None, timeout).await
}

/// Confirms the adult-content interstitial when one is shown.
pub async fn dismiss_age_gate<D: Driver>(page: &Page<'_, D>) -> bool {
    let clicked = page
        .click(&page.selectors.age_gate_button, page.timing.age_gate)
        .await;
    if clicked {
        tracing::info!("age gate confirmed");
        page.settle(page.timing.settle).await;
    }
    clicked
}

pub async fn extract_counters<D: Driver>(page: &Page<'_, D>) -> Counters {
    let sel = page.selectors;
    let patrons = counter_text(page, &sel.patron_count)
        .await
        .and_then(|t| parse_scaled_count(&t));
    let posts = counter_text(page, &sel.total_posts)
        .await
        .and_then(|t| parse_scaled_count(&t));
    let monthly_income = page
        .text_of(&sel.monthly_income, None, page.timing.control_probe)
        .await
        .and_then(|t| parse_scaled_number(&t));

    tracing::debug!(?patrons, ?posts, ?monthly_income, "header counters");
    Counters {
        patrons,
        posts,
        monthly_income,
    }
}

async fn first_digit_span<D: Driver>(page: &Page<'_, D>, scope: &D::Element) -> Option<String> {
    let spans = page
        .find_all_within(&page.selectors.counter_span, Some(scope), page.timing.probe)
        .await;
    for span in &spans {
        if let Some(text) = page.text(span).await {
            if has_digit(&text) {
                return Some(text);
            }
        }
    }
    None
}

/// Text carrying the number for a counter label.
///
/// The label's own text is used when it has digits. Otherwise the first
/// digit-bearing span under its parent, then under its enclosing `li`.
async fn counter_text<D: Driver>(page: &Page<'_, D>, label: &Locator) -> Option<String> {
    let element = page.find(label, None, page.timing.find).await?;
    let own = page.text(&element).await.unwrap_or_default();
    if has_digit(&own) {
        return Some(own);
    }

    let scopes = [
        page.parent(&element).await,
        page.ancestor(&element, "li").await,
    ];
    for scope in scopes.iter().flatten() {
        if let Some(text) = first_digit_span(page, scope).await {
            return Some(text);
        }
    }
    tracing::debug!(%label, "counter label found without a number");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture;

    const HEADER: &str = r#"
        <html><body>
          <h1 data-tag="creator-name"> Alice Makes Things </h1>
          <ul>
            <li><span>1.2K</span><span data-tag="patron-count">patrons</span></li>
            <li><div><span data-tag="creation-count">348 posts</span></div></li>
            <li><span data-tag="earnings-count">$2,150</span></li>
          </ul>
        </body></html>
    "#;

    #[tokio::test]
    async fn reads_name_and_counters() {
        let fx = fixture::load(HEADER, &[]).await;
        let page = fx.page();

        assert_eq!(
            read_creator_name(&page, Duration::ZERO).await.as_deref(),
            Some("Alice Makes Things")
        );
        let counters = extract_counters(&page).await;
        assert_eq!(counters.patrons, Some(1200));
        assert_eq!(counters.posts, Some(348));
        assert_eq!(counters.monthly_income, Some(2150.0));
    }

    #[tokio::test]
    async fn number_found_in_enclosing_list_item() {
        let html = r#"<html><body><ul><li>
              <span>87</span>
              <div><span data-tag="patron-count">patrons</span></div>
            </li></ul></body></html>"#;
        let fx = fixture::load(html, &[]).await;
        let counters = extract_counters(&fx.page()).await;
        assert_eq!(counters.patrons, Some(87));
    }

    #[tokio::test]
    async fn absent_counters_stay_unknown() {
        let fx = fixture::load("<html><body><h1>Nobody</h1></body></html>", &[]).await;
        let page = fx.page();
        assert_eq!(extract_counters(&page).await, Counters::default());
        assert!(!dismiss_age_gate(&page).await);
    }

    #[tokio::test]
    async fn age_gate_button_is_clicked() {
        let html = r#"<html><body>
            <button data-tag="age-verification-button-yes">Yes, I am over 18</button>
            </body></html>"#;
        let fx = fixture::load(html, &[]).await;
        assert!(dismiss_age_gate(&fx.page()).await);
    }
}
