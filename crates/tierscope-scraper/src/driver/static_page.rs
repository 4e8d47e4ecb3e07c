//! Static-HTML backend: pages fetched with `reqwest` (or preloaded) and
//! queried with `scraper`.
//!
//! No script runs, so scrolling and key presses are no-ops and the page never
//! grows. Clicking an anchor navigates to its `href`; clicking anything else
//! does nothing. Every document change bumps a generation counter, and
//! element handles from an older generation report [`DriverError::Stale`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tierscope_core::Locator;

use super::{Driver, ScrollTarget, SessionFactory};
use crate::error::DriverError;

/// Handle to one element of one document generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticElement {
    generation: u64,
    ordinal: usize,
}

#[derive(Debug)]
struct Document {
    url: String,
    html: String,
    generation: u64,
}

#[derive(Debug, Default)]
struct StaticState {
    pages: HashMap<String, String>,
    current: Option<Document>,
    history: Vec<String>,
    generation: u64,
}

impl StaticState {
    fn install(&mut self, url: &str, html: String) {
        self.generation += 1;
        self.current = Some(Document {
            url: url.to_string(),
            html,
            generation: self.generation,
        });
    }
}

pub struct StaticDriver {
    http: Client,
    state: Mutex<StaticState>,
}

impl StaticDriver {
    /// # Errors
    ///
    /// Returns [`DriverError::Http`] if the HTTP client cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, DriverError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            http,
            state: Mutex::new(StaticState::default()),
        })
    }

    /// Serve `html` for `url` instead of fetching it.
    #[must_use]
    pub fn with_page(self, url: &str, html: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.pages.insert(url.to_string(), html.to_string());
        }
        self
    }

    /// Register or replace a preloaded page.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Command`] if the driver state is poisoned.
    pub fn set_page(&self, url: &str, html: &str) -> Result<(), DriverError> {
        self.lock()?
            .pages
            .insert(url.to_string(), html.to_string());
        Ok(())
    }

    /// Swap the current document's markup in place, as a client-side
    /// re-render would. Existing element handles become stale.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Command`] if the driver state is poisoned.
    pub fn replace_html(&self, html: &str) -> Result<(), DriverError> {
        let mut state = self.lock()?;
        let url = state
            .current
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |d| d.url.clone());
        state.install(&url, html.to_string());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StaticState>, DriverError> {
        self.state
            .lock()
            .map_err(|_| DriverError::Command("static driver state poisoned".to_string()))
    }

    async fn load(&self, url: &str) -> Result<String, DriverError> {
        let preloaded = self.lock()?.pages.get(url).cloned();
        if let Some(html) = preloaded {
            return Ok(html);
        }

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        Ok(response.text().await?)
    }

    /// Runs `f` against the parsed current document and the resolved element.
    fn with_element<T>(
        &self,
        element: StaticElement,
        f: impl FnOnce(ElementRef<'_>, &str) -> T,
    ) -> Result<T, DriverError> {
        let state = self.lock()?;
        let doc = state.current.as_ref().ok_or(DriverError::Stale)?;
        if doc.generation != element.generation {
            return Err(DriverError::Stale);
        }
        let html = Html::parse_document(&doc.html);
        let all = universal()?;
        let resolved = html
            .select(&all)
            .nth(element.ordinal)
            .ok_or(DriverError::Stale)?;
        Ok(f(resolved, &doc.url))
    }

    fn find_all_now(
        &self,
        locator: &Locator,
        scope: Option<StaticElement>,
    ) -> Result<Vec<StaticElement>, DriverError> {
        let css = css_for(locator)?;
        let selector = Selector::parse(&css).map_err(|e| DriverError::InvalidLocator {
            locator: locator.to_string(),
            reason: format!("{e:?}"),
        })?;

        let state = self.lock()?;
        let Some(doc) = state.current.as_ref() else {
            return Ok(Vec::new());
        };
        let html = Html::parse_document(&doc.html);
        let all = universal()?;
        let ordinals: HashMap<_, usize> = html
            .select(&all)
            .enumerate()
            .map(|(i, e)| (e.id(), i))
            .collect();

        let matches: Vec<ElementRef<'_>> = match scope {
            Some(scope) => {
                if scope.generation != doc.generation {
                    return Err(DriverError::Stale);
                }
                let root = html
                    .select(&all)
                    .nth(scope.ordinal)
                    .ok_or(DriverError::Stale)?;
                root.select(&selector).filter(|e| e.id() != root.id()).collect()
            }
            None => html.select(&selector).collect(),
        };

        Ok(matches
            .into_iter()
            .filter_map(|e| ordinals.get(&e.id()).copied())
            .map(|ordinal| StaticElement {
                generation: doc.generation,
                ordinal,
            })
            .collect())
    }

    /// Target of a click: the nearest enclosing anchor's resolved href.
    fn click_target(&self, element: StaticElement) -> Result<Option<String>, DriverError> {
        self.with_element(element, |el, base| {
            std::iter::successors(Some(el), |e| e.parent().and_then(ElementRef::wrap))
                .find(|e| e.value().name() == "a")
                .and_then(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty() && !href.starts_with('#'))
                .filter(|href| !href.starts_with("javascript:"))
                .map(|href| resolve_href(base, href))
        })
    }
}

fn universal() -> Result<Selector, DriverError> {
    Selector::parse("*").map_err(|e| DriverError::InvalidLocator {
        locator: "css=*".to_string(),
        reason: format!("{e:?}"),
    })
}

fn css_for(locator: &Locator) -> Result<String, DriverError> {
    match locator {
        Locator::Css(expr) | Locator::Tag(expr) => Ok(expr.clone()),
        Locator::Id(id) => Ok(format!("[id=\"{}\"]", id.replace('"', "\\\""))),
        Locator::XPath(_) => Err(DriverError::UnsupportedLocator(locator.to_string())),
    }
}

fn resolve_href(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map_or_else(|_| href.to_string(), |u| u.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Driver for StaticDriver {
    type Element = StaticElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let html = self.load(url).await?;
        let mut state = self.lock()?;
        if let Some(previous) = state.current.take() {
            state.history.push(previous.url);
        }
        state.install(url, html);
        tracing::debug!(url, "static page loaded");
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self
            .lock()?
            .current
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |d| d.url.clone()))
    }

    async fn back(&self) -> Result<(), DriverError> {
        let previous = self.lock()?.history.pop();
        let Some(url) = previous else {
            return Ok(());
        };
        let html = self.load(&url).await?;
        self.lock()?.install(&url, html);
        Ok(())
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&StaticElement>,
    ) -> Result<Vec<StaticElement>, DriverError> {
        self.find_all_now(locator, scope.copied())
    }

    async fn parent(&self, element: &StaticElement) -> Result<Option<StaticElement>, DriverError> {
        let generation = element.generation;
        let parent_id = self.with_element(*element, |el, _| {
            el.parent().and_then(ElementRef::wrap).map(|p| p.id())
        })?;
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let state = self.lock()?;
        let doc = state.current.as_ref().ok_or(DriverError::Stale)?;
        let html = Html::parse_document(&doc.html);
        let all = universal()?;
        Ok(html
            .select(&all)
            .position(|e| e.id() == parent_id)
            .map(|ordinal| StaticElement {
                generation,
                ordinal,
            }))
    }

    async fn tag_name(&self, element: &StaticElement) -> Result<String, DriverError> {
        self.with_element(*element, |el, _| el.value().name().to_ascii_lowercase())
    }

    async fn text(&self, element: &StaticElement) -> Result<String, DriverError> {
        self.with_element(*element, |el, _| {
            collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
        })
    }

    async fn text_content(&self, element: &StaticElement) -> Result<String, DriverError> {
        self.with_element(*element, |el, _| el.text().collect::<String>())
    }

    async fn attribute(
        &self,
        element: &StaticElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.with_element(*element, |el, base| {
            el.value().attr(name).map(|v| {
                if name == "href" {
                    resolve_href(base, v.trim())
                } else {
                    v.to_string()
                }
            })
        })
    }

    async fn is_interactive(&self, element: &StaticElement) -> Result<bool, DriverError> {
        self.with_element(*element, |el, _| {
            let attrs = el.value();
            attrs.attr("disabled").is_none() && attrs.attr("hidden").is_none()
        })
    }

    async fn scroll_into_view(&self, element: &StaticElement) -> Result<(), DriverError> {
        self.with_element(*element, |_, _| ())
    }

    async fn click(&self, element: &StaticElement) -> Result<(), DriverError> {
        if let Some(target) = self.click_target(*element)? {
            self.navigate(&target).await?;
        }
        Ok(())
    }

    async fn script_click(&self, element: &StaticElement) -> Result<(), DriverError> {
        self.click(element).await
    }

    async fn scroll_to(&self, _target: ScrollTarget) -> Result<(), DriverError> {
        Ok(())
    }

    async fn page_height(&self) -> Result<u64, DriverError> {
        let state = self.lock()?;
        Ok(state
            .current
            .as_ref()
            .map_or(0, |d| u64::try_from(d.html.len()).unwrap_or(u64::MAX)))
    }

    async fn press_escape(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        let mut state = self.lock()?;
        state.current = None;
        state.history.clear();
        Ok(())
    }
}

/// Opens [`StaticDriver`] sessions sharing one set of preloaded pages.
#[derive(Debug, Clone)]
pub struct StaticSessionFactory {
    timeout_secs: u64,
    user_agent: String,
    pages: HashMap<String, String>,
}

impl StaticSessionFactory {
    #[must_use]
    pub fn new(timeout_secs: u64, user_agent: impl Into<String>) -> Self {
        Self {
            timeout_secs,
            user_agent: user_agent.into(),
            pages: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl SessionFactory for StaticSessionFactory {
    type Driver = StaticDriver;

    async fn open(&self) -> Result<StaticDriver, DriverError> {
        let driver = StaticDriver::new(self.timeout_secs, &self.user_agent)?;
        for (url, html) in &self.pages {
            driver.set_page(url, html)?;
        }
        Ok(driver)
    }
}
