//! Membership tier cards, including horizontally paginated carousels.

use std::collections::HashSet;

use tierscope_core::TierCard;

use crate::driver::Driver;
use crate::locate::Page;
use crate::normalize::{parse_scaled_number, word_count};

/// Where the tier cards live on this profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierEntry {
    /// "Become a member" leads to a separate tiers page.
    DedicatedPage,
    /// "See membership options" opens a dialog over the profile.
    Dialog,
    /// Cards are rendered on the profile itself.
    Inline,
}

/// How a card's description is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    /// Profile and dialog cards with a plain description block.
    Compact,
    /// Tiers-page cards whose description hides behind "Show more".
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselState {
    Present,
    Absent,
}

pub async fn detect_entry<D: Driver>(page: &Page<'_, D>) -> TierEntry {
    let sel = page.selectors;
    if page
        .exists(&sel.become_member_button, page.timing.control_probe)
        .await
    {
        TierEntry::DedicatedPage
    } else if page
        .exists(&sel.see_membership_button, page.timing.control_probe)
        .await
    {
        TierEntry::Dialog
    } else {
        TierEntry::Inline
    }
}

pub async fn extract_tiers<D: Driver>(page: &Page<'_, D>) -> Vec<TierCard> {
    let sel = page.selectors;
    let entry = detect_entry(page).await;
    tracing::debug!(?entry, "tier entry");

    let tiers = match entry {
        TierEntry::DedicatedPage => {
            let origin = page.driver.current_url().await.ok();
            if !page.click(&sel.become_member_button, page.timing.click).await {
                tracing::debug!("become-a-member button not clickable");
                return Vec::new();
            }
            let tiers = if page.exists(&sel.tier_card, page.timing.section).await {
                scan_cards(page, CardLayout::Expanded).await
            } else {
                tracing::debug!("tiers page showed no cards");
                Vec::new()
            };
            leave_tiers_page(page, origin.as_deref()).await;
            tiers
        }
        TierEntry::Dialog => {
            if !page.click(&sel.see_membership_button, page.timing.click).await {
                tracing::debug!("membership options button not clickable");
                return Vec::new();
            }
            let tiers = if page.exists(&sel.membership_dialog, page.timing.find).await {
                scan_cards(page, CardLayout::Compact).await
            } else {
                tracing::debug!("membership dialog never opened");
                Vec::new()
            };
            close_dialog(page).await;
            tiers
        }
        TierEntry::Inline => scan_cards(page, CardLayout::Compact).await,
    };

    tracing::info!(count = tiers.len(), "membership tiers");
    tiers
}

async fn leave_tiers_page<D: Driver>(page: &Page<'_, D>, origin: Option<&str>) {
    let moved = match (origin, page.driver.current_url().await) {
        (Some(origin), Ok(current)) => current != origin,
        _ => true,
    };
    if !moved {
        return;
    }
    if let Err(e) = page.driver.back().await {
        tracing::warn!(error = %e, "could not leave tiers page");
        return;
    }
    if !page
        .exists(&page.selectors.creator_name, page.timing.return_landmark)
        .await
    {
        tracing::warn!("profile landmark missing after leaving tiers page");
    }
}

async fn close_dialog<D: Driver>(page: &Page<'_, D>) {
    if page
        .click(&page.selectors.dialog_close_button, page.timing.control_probe)
        .await
    {
        return;
    }
    if let Err(e) = page.driver.press_escape().await {
        tracing::debug!(error = %e, "escape key failed");
    }
}

/// Tier cards seen so far, in first-seen order. An id is parsed once.
#[derive(Debug, Default)]
struct CardCollector {
    seen: HashSet<String>,
    cards: Vec<TierCard>,
}

impl CardCollector {
    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn record(&mut self, card: TierCard) {
        if self.seen.insert(card.id.clone()) {
            self.cards.push(card);
        }
    }

    fn len(&self) -> usize {
        self.cards.len()
    }
}

/// Parses every distinct tier card reachable on the current view.
///
/// With a carousel, scrolls fully left first, then steps right while new
/// card ids keep appearing.
pub async fn scan_cards<D: Driver>(page: &Page<'_, D>, layout: CardLayout) -> Vec<TierCard> {
    let sel = page.selectors;
    let timing = page.timing;
    if !page.exists(&sel.tier_card, timing.find).await {
        return Vec::new();
    }

    let mut collector = CardCollector::default();
    let state = if page.exists(&sel.carousel_right, timing.carousel_probe).await {
        CarouselState::Present
    } else {
        CarouselState::Absent
    };
    tracing::debug!(?state, "tier carousel");

    match state {
        CarouselState::Absent => collect_visible(page, layout, &mut collector).await,
        CarouselState::Present => {
            let mut left_clicks = 0;
            while left_clicks < timing.carousel_max_clicks
                && page
                    .exists(&sel.carousel_left_clickable, timing.carousel_step_probe)
                    .await
            {
                if !page.click(&sel.carousel_left_clickable, timing.carousel_step_probe).await {
                    break;
                }
                left_clicks += 1;
                page.settle(timing.carousel_left_settle).await;
            }
            tracing::debug!(left_clicks, "carousel rewound");

            collect_visible(page, layout, &mut collector).await;

            for step in 0..timing.carousel_max_clicks {
                if !page
                    .exists(&sel.carousel_right_clickable, timing.carousel_step_probe)
                    .await
                {
                    break;
                }
                if !page.click(&sel.carousel_right_clickable, timing.click).await {
                    break;
                }
                page.settle(timing.carousel_right_settle).await;

                let before = collector.len();
                collect_visible(page, layout, &mut collector).await;
                if collector.len() == before {
                    tracing::debug!(step, "carousel step showed no new cards");
                    break;
                }
            }
        }
    }

    collector.cards
}

async fn collect_visible<D: Driver>(
    page: &Page<'_, D>,
    layout: CardLayout,
    collector: &mut CardCollector,
) {
    for card in page.find_all(&page.selectors.tier_card, None).await {
        let Some(id) = page.attribute(&card, "id").await.filter(|id| !id.is_empty()) else {
            tracing::debug!("tier card without id skipped");
            continue;
        };
        if collector.contains(&id) {
            continue;
        }
        let parsed = parse_card(page, &card, id, layout).await;
        if !parsed.has_content() {
            tracing::debug!(tier_id = %parsed.id, "tier card has neither name nor price");
        }
        collector.record(parsed);
    }
}

async fn parse_card<D: Driver>(
    page: &Page<'_, D>,
    card: &D::Element,
    id: String,
    layout: CardLayout,
) -> TierCard {
    let sel = page.selectors;
    let wait = page.timing.card_field;

    let name = match page.find(&sel.tier_name, Some(card), wait).await {
        Some(el) => page.text_content(&el).await.unwrap_or_default(),
        None => String::new(),
    };
    let price = match page.find(&sel.tier_price, Some(card), wait).await {
        Some(el) => page
            .text_content(&el)
            .await
            .and_then(|t| parse_scaled_number(&t))
            .unwrap_or(0.0),
        None => 0.0,
    };

    let description = match layout {
        CardLayout::Compact => &sel.tier_description,
        CardLayout::Expanded => {
            if let Some(more) = page.find(&sel.tier_show_more, Some(card), page.timing.probe).await {
                if let Err(e) = page.driver.script_click(&more).await {
                    tracing::debug!(error = %e, "show-more click failed");
                }
                page.settle(page.timing.settle).await;
            }
            &sel.tier_page_description
        }
    };
    let description_words = match page.find(description, Some(card), page.timing.probe).await {
        Some(el) => page
            .text_content(&el)
            .await
            .map_or(0, |t| word_count(&t)),
        None => 0,
    };

    TierCard {
        id,
        name,
        price,
        description_words,
    }
}
