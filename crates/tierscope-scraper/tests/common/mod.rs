//! Shared fixtures for the integration tests: CSS selector overrides for the
//! static driver, HTML builders, and a decorating driver that can misbehave
//! on purpose.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tierscope_core::{Locator, SelectorSet};
use tierscope_scraper::{Driver, DriverError, ScrollTarget, StaticDriver, StaticElement};

pub const UA: &str = "tierscope-test/0.1";

/// The static driver cannot evaluate XPath; these stand in for the XPath
/// defaults.
pub fn css_selectors() -> SelectorSet {
    SelectorSet {
        creator_name: Locator::css("h1[data-tag='creator-name']"),
        post_type_count: Locator::css("span + div"),
        filter_post_type_item: Locator::css("div[data-tag='post-type-filters'] button"),
        load_more_button: Locator::css("button[data-tag='load-more']"),
        tier_name: Locator::css("[data-tag='tier-name']"),
        tier_price: Locator::css("[data-tag='tier-price']"),
        tier_description: Locator::css("[data-tag='tier-description']"),
        tier_show_more: Locator::css("button[data-tag='show-more']"),
        tier_page_description: Locator::css("[data-tag='tier-page-description']"),
        ..SelectorSet::default()
    }
}

pub fn profile(name: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{name}</title></head><body>
             <header><h1 data-tag="creator-name">{name}</h1></header>
             {body}
           </body></html>"#
    )
}

pub fn tier_card(id: &str, name: &str, price: &str) -> String {
    format!(
        r#"<div data-tag="tier-card" id="{id}">
             <div data-tag="tier-name">{name}</div>
             <div data-tag="tier-price">{price}</div>
             <div data-tag="tier-description">Access to {name} posts</div>
           </div>"#
    )
}

/// One carousel view: the given cards plus scroll buttons.
pub fn carousel_frame(cards: &[&str], left_enabled: bool, right_enabled: bool) -> String {
    let cards: String = cards
        .iter()
        .map(|id| tier_card(id, &format!("Tier {id}"), "$5"))
        .collect();
    let disabled = |enabled: bool| if enabled { "false" } else { "true" };
    profile(
        "Carousel Creator",
        &format!(
            r#"<div class="tiers">
                 <button data-tag="carousel-left" aria-disabled="{}">&lt;</button>
                 {cards}
                 <button data-tag="carousel-right" aria-disabled="{}">&gt;</button>
               </div>"#,
            disabled(left_enabled),
            disabled(right_enabled)
        ),
    )
}

/// Wraps a [`StaticDriver`] and optionally:
/// - rejects native clicks as intercepted,
/// - re-renders between carousel frames on scroll-button clicks,
/// - fails `current_url` as if the browser connection dropped,
/// - fails `navigate` as if the browser session died,
/// - reports the element with a given `id` as stale when used as a scope,
/// - swaps in new markup when an element with a given `data-tag` is clicked,
/// - counts lookups of one watched locator.
pub struct TestDriver {
    pub inner: StaticDriver,
    pub intercept_clicks: bool,
    pub broken_current_url: bool,
    pub lost_session: bool,
    pub stale_scope_id: Option<String>,
    pub click_renders: Vec<(String, String)>,
    pub frames: Vec<String>,
    pub frame: Mutex<usize>,
    pub watched: Option<Locator>,
    pub watched_lookups: AtomicUsize,
    pub script_clicks: AtomicUsize,
}

impl TestDriver {
    pub fn new(inner: StaticDriver) -> Self {
        Self {
            inner,
            intercept_clicks: false,
            broken_current_url: false,
            lost_session: false,
            stale_scope_id: None,
            click_renders: Vec::new(),
            frames: Vec::new(),
            frame: Mutex::new(0),
            watched: None,
            watched_lookups: AtomicUsize::new(0),
            script_clicks: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.watched_lookups.load(Ordering::SeqCst)
    }

    pub fn script_click_count(&self) -> usize {
        self.script_clicks.load(Ordering::SeqCst)
    }

    /// Move to the neighbouring carousel frame. Returns `true` when the
    /// click hit a carousel button.
    async fn step_carousel(&self, element: &StaticElement) -> Result<bool, DriverError> {
        if self.frames.is_empty() {
            return Ok(false);
        }
        let tag = self.inner.attribute(element, "data-tag").await?;
        let next = {
            let mut frame = self.frame.lock().unwrap();
            match tag.as_deref() {
                Some("carousel-right") if *frame + 1 < self.frames.len() => *frame += 1,
                Some("carousel-left") if *frame > 0 => *frame -= 1,
                Some("carousel-right" | "carousel-left") => {}
                _ => return Ok(false),
            }
            self.frames[*frame].clone()
        };
        self.inner.replace_html(&next)?;
        Ok(true)
    }

    /// Install the markup registered for the clicked element's `data-tag`.
    /// Returns `true` when one was registered.
    async fn render_click(&self, element: &StaticElement) -> Result<bool, DriverError> {
        if self.click_renders.is_empty() {
            return Ok(false);
        }
        let Some(tag) = self.inner.attribute(element, "data-tag").await? else {
            return Ok(false);
        };
        match self.click_renders.iter().find(|(t, _)| *t == tag) {
            Some((_, html)) => {
                self.inner.replace_html(html)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Driver for TestDriver {
    type Element = StaticElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        if self.lost_session {
            return Err(DriverError::SessionLost("browser window closed".to_string()));
        }
        self.inner.navigate(url).await
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        if self.broken_current_url {
            return Err(DriverError::Command("connection reset".to_string()));
        }
        self.inner.current_url().await
    }

    async fn back(&self) -> Result<(), DriverError> {
        self.inner.back().await
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&StaticElement>,
    ) -> Result<Vec<StaticElement>, DriverError> {
        if self.watched.as_ref() == Some(locator) {
            self.watched_lookups.fetch_add(1, Ordering::SeqCst);
        }
        if let (Some(id), Some(scope)) = (&self.stale_scope_id, scope) {
            if self.inner.attribute(scope, "id").await?.as_ref() == Some(id) {
                return Err(DriverError::Stale);
            }
        }
        self.inner.find_all(locator, scope).await
    }

    async fn parent(&self, element: &StaticElement) -> Result<Option<StaticElement>, DriverError> {
        self.inner.parent(element).await
    }

    async fn tag_name(&self, element: &StaticElement) -> Result<String, DriverError> {
        self.inner.tag_name(element).await
    }

    async fn text(&self, element: &StaticElement) -> Result<String, DriverError> {
        self.inner.text(element).await
    }

    async fn text_content(&self, element: &StaticElement) -> Result<String, DriverError> {
        self.inner.text_content(element).await
    }

    async fn attribute(
        &self,
        element: &StaticElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.inner.attribute(element, name).await
    }

    async fn is_interactive(&self, element: &StaticElement) -> Result<bool, DriverError> {
        self.inner.is_interactive(element).await
    }

    async fn scroll_into_view(&self, element: &StaticElement) -> Result<(), DriverError> {
        self.inner.scroll_into_view(element).await
    }

    async fn click(&self, element: &StaticElement) -> Result<(), DriverError> {
        if self.intercept_clicks {
            return Err(DriverError::ClickIntercepted);
        }
        if self.step_carousel(element).await? || self.render_click(element).await? {
            return Ok(());
        }
        self.inner.click(element).await
    }

    async fn script_click(&self, element: &StaticElement) -> Result<(), DriverError> {
        self.script_clicks.fetch_add(1, Ordering::SeqCst);
        if self.step_carousel(element).await? || self.render_click(element).await? {
            return Ok(());
        }
        self.inner.click(element).await
    }

    async fn scroll_to(&self, target: ScrollTarget) -> Result<(), DriverError> {
        self.inner.scroll_to(target).await
    }

    async fn page_height(&self) -> Result<u64, DriverError> {
        self.inner.page_height().await
    }

    async fn press_escape(&self) -> Result<(), DriverError> {
        self.inner.press_escape().await
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.inner.close().await
    }
}
