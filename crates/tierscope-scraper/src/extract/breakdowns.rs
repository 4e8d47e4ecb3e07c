//! Post counts by year, tier and post type, read from the feed's sort
//! dropdowns or from the consolidated filter dialog that replaced them.

use tierscope_core::{BreakdownMap, Breakdowns, Locator, SelectorSet};

use crate::driver::{Driver, ScrollTarget};
use crate::locate::Page;
use crate::normalize::{
    extract_first_integer, parse_labeled_count, parse_parenthesized_count, parse_tier_label,
};

/// Post-type key for items whose icon could not be found.
pub const UNKNOWN_POST_TYPE: &str = "unknown_type_no_svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownKind {
    Year,
    Tier,
    PostType,
}

impl BreakdownKind {
    fn label(self) -> &'static str {
        match self {
            BreakdownKind::Year => "year",
            BreakdownKind::Tier => "tier",
            BreakdownKind::PostType => "post_type",
        }
    }

    /// Trigger button, popover container and item locators.
    fn locators(self, sel: &SelectorSet) -> (&Locator, &Locator, &Locator) {
        match self {
            BreakdownKind::Year => (&sel.year_button, &sel.year_dropdown, &sel.year_item),
            BreakdownKind::Tier => (&sel.tier_button, &sel.tier_dropdown, &sel.tier_item),
            BreakdownKind::PostType => (
                &sel.post_type_button,
                &sel.post_type_dropdown,
                &sel.post_type_item,
            ),
        }
    }
}

/// Which filter UI the feed uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLayout {
    /// One dialog holding both the post-type and the date filters.
    Consolidated,
    /// Separate year and post-type dropdowns.
    Dropdowns,
}

/// Maps a post-type icon's `data-tag` to its category.
///
/// Hand-maintained against the platform's icon names; an icon added upstream
/// lands in an `other_posts_<tag>` bucket until it is listed here.
#[must_use]
pub fn post_type_for_icon(tag: &str) -> String {
    let known = match tag {
        "IconPhoto" => "image_posts",
        "IconPoll" => "poll_posts",
        "IconEditorText" => "text_posts",
        "IconVideo" => "video_posts",
        "IconMicrophone" => "audio_posts",
        "IconPodcast" => "podcast_posts",
        "IconEditorLink" => "link_posts",
        "IconLivestream" => "livestream_posts",
        _ => return format!("other_posts_{tag}"),
    };
    known.to_string()
}

pub async fn extract_breakdowns<D: Driver>(page: &Page<'_, D>) -> Breakdowns {
    let tiers = read_dropdown(page, BreakdownKind::Tier).await;

    let layout = if page
        .exists(&page.selectors.filter_toggle, page.timing.control_probe)
        .await
    {
        FilterLayout::Consolidated
    } else {
        FilterLayout::Dropdowns
    };
    tracing::debug!(?layout, "feed filter layout");

    let (years, post_types) = match layout {
        FilterLayout::Consolidated => read_filter_dialog(page).await,
        FilterLayout::Dropdowns => (
            read_dropdown(page, BreakdownKind::Year).await,
            read_dropdown(page, BreakdownKind::PostType).await,
        ),
    };

    tracing::info!(
        years = years.len(),
        tiers = tiers.len(),
        post_types = post_types.len(),
        "post breakdowns"
    );
    Breakdowns {
        years,
        tiers,
        post_types,
    }
}

/// Open one sort dropdown, read its items, close it.
pub async fn read_dropdown<D: Driver>(page: &Page<'_, D>, kind: BreakdownKind) -> BreakdownMap {
    let (trigger, container, item) = kind.locators(page.selectors);
    let mut counts = BreakdownMap::new();

    page.scroll_to(ScrollTarget::Top).await;
    if !page.click(trigger, page.timing.click).await {
        tracing::debug!(kind = kind.label(), "dropdown trigger not available");
        return counts;
    }

    let Some(popover) = page.find(container, None, page.timing.find_all).await else {
        tracing::debug!(kind = kind.label(), "dropdown did not open");
        page.dismiss_popover().await;
        return counts;
    };

    for element in page.find_all(item, Some(&popover)).await {
        let parsed = match kind {
            BreakdownKind::Year => page.text(&element).await.and_then(|t| parse_labeled_count(&t)),
            BreakdownKind::Tier => page
                .text_of(&page.selectors.tier_item_label, Some(&element), page.timing.probe)
                .await
                .map(|t| parse_tier_label(&t)),
            BreakdownKind::PostType => Some(read_post_type_item(page, &element).await),
        };
        if let Some((label, count)) = parsed {
            counts.insert(label, count);
        }
    }

    page.dismiss_popover().await;
    counts
}

/// Post types and years from the consolidated filter dialog.
pub async fn read_filter_dialog<D: Driver>(page: &Page<'_, D>) -> (BreakdownMap, BreakdownMap) {
    let sel = page.selectors;
    let mut years = BreakdownMap::new();
    let mut post_types = BreakdownMap::new();

    if !page.click(&sel.filter_toggle, page.timing.control_probe).await {
        tracing::debug!("filter toggle not clickable");
        return (years, post_types);
    }
    let Some(dialog) = page.find(&sel.filter_dialog, None, page.timing.control_probe).await else {
        tracing::debug!("filter dialog did not open");
        return (years, post_types);
    };

    for item in page.find_all(&sel.filter_post_type_item, Some(&dialog)).await {
        let (label, count) = read_post_type_item(page, &item).await;
        post_types.insert(label, count);
    }

    for radio in page.find_all(&sel.filter_year_item, Some(&dialog)).await {
        let parsed = page
            .text_of(&sel.filter_year_label, Some(&radio), page.timing.probe)
            .await
            .and_then(|t| parse_labeled_count(&t));
        if let Some((year, count)) = parsed {
            years.insert(year, count);
        }
    }

    page.dismiss_popover().await;
    (years, post_types)
}

/// Category from the item's icon, count from the text beside it.
async fn read_post_type_item<D: Driver>(page: &Page<'_, D>, item: &D::Element) -> (String, u64) {
    let sel = page.selectors;
    let wait = page.timing.probe;

    let label = match page.find(&sel.post_type_icon, Some(item), wait).await {
        Some(icon) => page
            .attribute(&icon, "data-tag")
            .await
            .map_or_else(|| UNKNOWN_POST_TYPE.to_string(), |tag| post_type_for_icon(&tag)),
        None => UNKNOWN_POST_TYPE.to_string(),
    };

    let text = match page.find(&sel.post_type_count, Some(item), wait).await {
        Some(count) => page.text(&count).await,
        None => page.text(item).await,
    };
    // "Images (9)" normally; some layouts drop the parentheses.
    let count = text.map_or(0, |t| {
        parse_parenthesized_count(&t).unwrap_or_else(|| extract_first_integer(&t))
    });

    (label, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture;

    const DROPDOWNS: &str = r#"<html><body>
        <button aria-label="Sort posts by tier">Tier</button>
        <div role="dialog" aria-label="Sort posts by tier">
          <a><p>Public (4)</p></a>
          <a><p>Gold Supporter (12)</p></a>
          <a><span>no label</span></a>
        </div>
        <button aria-label="Sort posts by date">Date</button>
        <div role="dialog" aria-label="Sort posts by date">
          <a>2024 (30)</a>
          <a>2023 (18)</a>
          <a>Older</a>
        </div>
        <button aria-label="Sort posts by post type">Type</button>
        <div role="dialog" aria-label="Sort posts by post type">
          <button><span><svg data-tag="IconPhoto"></svg></span><div>Images (9)</div></button>
          <button><span><svg data-tag="IconSparkle"></svg></span><div>Sparkles (2)</div></button>
          <button><b>Mystery (5)</b></button>
          <button><span><svg data-tag="IconPoll"></svg></span><div>Polls 4</div></button>
        </div>
        </body></html>"#;

    #[tokio::test]
    async fn legacy_dropdowns() {
        let fx = fixture::load(DROPDOWNS, &[]).await;
        let breakdowns = extract_breakdowns(&fx.page()).await;

        assert_eq!(breakdowns.tiers.get("public"), Some(&4));
        assert_eq!(breakdowns.tiers.get("gold_supporter"), Some(&12));
        assert_eq!(breakdowns.tiers.len(), 2);

        assert_eq!(breakdowns.years.get("2024"), Some(&30));
        assert_eq!(breakdowns.years.get("2023"), Some(&18));
        assert_eq!(breakdowns.years.len(), 2);

        assert_eq!(breakdowns.post_types.get("image_posts"), Some(&9));
        assert_eq!(breakdowns.post_types.get("other_posts_IconSparkle"), Some(&2));
        assert_eq!(breakdowns.post_types.get(UNKNOWN_POST_TYPE), Some(&5));
        assert_eq!(breakdowns.post_types.get("poll_posts"), Some(&4));
    }

    #[tokio::test]
    async fn consolidated_filter_dialog() {
        let html = r#"<html><body>
            <button data-tag="post-feed-consolidated-filters-toggle">Filters</button>
            <div id="post-feed-filter-dialog">
              <div data-tag="post-type-filters">
                <button><span><svg data-tag="IconVideo"></svg></span><div>Video (3)</div></button>
                <button><span><svg data-tag="IconEditorText"></svg></span><div>Text (11)</div></button>
              </div>
              <div aria-label="Date Filter" role="radiogroup">
                <div role="radio"><p>2022 (7)</p></div>
                <div role="radio"><p>All time</p></div>
              </div>
            </div>
            </body></html>"#;
        let fx = fixture::load(html, &[]).await;
        let breakdowns = extract_breakdowns(&fx.page()).await;

        assert!(breakdowns.tiers.is_empty());
        assert_eq!(breakdowns.post_types.get("video_posts"), Some(&3));
        assert_eq!(breakdowns.post_types.get("text_posts"), Some(&11));
        assert_eq!(breakdowns.years.len(), 1);
        assert_eq!(breakdowns.years.get("2022"), Some(&7));
    }

    #[tokio::test]
    async fn missing_controls_give_empty_maps() {
        let fx = fixture::load("<html><body><p>No feed</p></body></html>", &[]).await;
        assert_eq!(extract_breakdowns(&fx.page()).await, Breakdowns::default());
    }

    #[test]
    fn icon_table() {
        assert_eq!(post_type_for_icon("IconMicrophone"), "audio_posts");
        assert_eq!(post_type_for_icon("IconLivestream"), "livestream_posts");
        assert_eq!(post_type_for_icon("IconNew"), "other_posts_IconNew");
    }
}
