//! Element lookup with bounded waits.
//!
//! Sections load asynchronously, so "not there yet" and "not there at all"
//! look the same to a caller: every lookup here returns `None` or an empty
//! `Vec` instead of an error once its wait budget is spent.

use std::time::Duration;

use tierscope_core::{Locator, SelectorSet};
use tokio::time::Instant;

use crate::driver::{Driver, ScrollTarget};
use crate::error::DriverError;
use crate::timing::Timing;

/// One browser page plus the selector table and wait budgets extractors
/// read it with.
pub struct Page<'a, D: Driver> {
    pub driver: &'a D,
    pub selectors: &'a SelectorSet,
    pub timing: &'a Timing,
}

impl<D: Driver> Clone for Page<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Page<'_, D> {}

impl<'a, D: Driver> Page<'a, D> {
    #[must_use]
    pub fn new(driver: &'a D, selectors: &'a SelectorSet, timing: &'a Timing) -> Self {
        Self {
            driver,
            selectors,
            timing,
        }
    }

    /// First element matching `locator`, polling until `timeout` elapses.
    ///
    /// One lookup is always attempted, even with a zero timeout.
    pub async fn find(
        &self,
        locator: &Locator,
        scope: Option<&D::Element>,
        timeout: Duration,
    ) -> Option<D::Element> {
        self.poll(locator, scope, timeout).await.into_iter().next()
    }

    /// Every element matching `locator`, waiting up to the multi-element
    /// budget for at least one to appear.
    pub async fn find_all(&self, locator: &Locator, scope: Option<&D::Element>) -> Vec<D::Element> {
        self.poll(locator, scope, self.timing.find_all).await
    }

    pub async fn find_all_within(
        &self,
        locator: &Locator,
        scope: Option<&D::Element>,
        timeout: Duration,
    ) -> Vec<D::Element> {
        self.poll(locator, scope, timeout).await
    }

    pub async fn exists(&self, locator: &Locator, timeout: Duration) -> bool {
        self.find(locator, None, timeout).await.is_some()
    }

    /// Waits until any of `locators` matches. Returns the index of the first
    /// one that did.
    pub async fn find_any(&self, locators: &[&Locator], timeout: Duration) -> Option<usize> {
        let deadline = Instant::now() + timeout;
        loop {
            for (index, locator) in locators.iter().enumerate() {
                if !self.attempt(locator, None).await.unwrap_or_default().is_empty() {
                    return Some(index);
                }
            }
            if !self.pause_until(deadline).await {
                return None;
            }
        }
    }

    /// Single lookup under `scope` that still reports a stale scope.
    ///
    /// Other lookup-class failures read as "no match"; session-level failures
    /// are returned.
    pub async fn probe_within(
        &self,
        locator: &Locator,
        scope: &D::Element,
    ) -> Result<Vec<D::Element>, DriverError> {
        match self.driver.find_all(locator, Some(scope)).await {
            Ok(found) => Ok(found),
            Err(DriverError::Stale) => Err(DriverError::Stale),
            Err(e) if e.is_lookup() => {
                tracing::debug!(%locator, error = %e, "scoped lookup failed");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn poll(
        &self,
        locator: &Locator,
        scope: Option<&D::Element>,
        timeout: Duration,
    ) -> Vec<D::Element> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.attempt(locator, scope).await {
                Some(found) if !found.is_empty() => return found,
                Some(_) => {}
                None => return Vec::new(),
            }
            if !self.pause_until(deadline).await {
                tracing::debug!(%locator, timeout_ms = timeout.as_millis(), "element not found");
                return Vec::new();
            }
        }
    }

    /// One lookup. `None` means polling again cannot help.
    async fn attempt(&self, locator: &Locator, scope: Option<&D::Element>) -> Option<Vec<D::Element>> {
        match self.driver.find_all(locator, scope).await {
            Ok(found) => Some(found),
            Err(e @ (DriverError::UnsupportedLocator(_) | DriverError::InvalidLocator { .. })) => {
                tracing::debug!(%locator, error = %e, "locator cannot be evaluated");
                None
            }
            Err(DriverError::Stale) if scope.is_some() => {
                tracing::debug!(%locator, "lookup scope went stale");
                None
            }
            Err(e) if e.is_lookup() => {
                tracing::debug!(%locator, error = %e, "lookup failed; retrying");
                Some(Vec::new())
            }
            Err(e) => {
                tracing::warn!(%locator, error = %e, "driver failed during lookup");
                None
            }
        }
    }

    /// Sleeps one poll interval without passing `deadline`. Returns `false`
    /// once the deadline has been reached.
    async fn pause_until(&self, deadline: Instant) -> bool {
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(self.timing.poll_interval.min(deadline - now)).await;
        true
    }

    /// Whitespace-collapsed visible text, `None` when unreadable.
    pub async fn text(&self, element: &D::Element) -> Option<String> {
        match self.driver.text(element).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "cannot read element text");
                None
            }
        }
    }

    /// Raw `textContent`, trimmed. Includes text of collapsed sections.
    pub async fn text_content(&self, element: &D::Element) -> Option<String> {
        match self.driver.text_content(element).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "cannot read element text content");
                None
            }
        }
    }

    /// Text of the first match under `scope`.
    pub async fn text_of(
        &self,
        locator: &Locator,
        scope: Option<&D::Element>,
        timeout: Duration,
    ) -> Option<String> {
        let element = self.find(locator, scope, timeout).await?;
        self.text(&element).await
    }

    pub async fn attribute(&self, element: &D::Element, name: &str) -> Option<String> {
        match self.driver.attribute(element, name).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(attribute = name, error = %e, "cannot read attribute");
                None
            }
        }
    }

    pub async fn parent(&self, element: &D::Element) -> Option<D::Element> {
        self.driver.parent(element).await.ok().flatten()
    }

    /// Nearest ancestor with the given element name, not counting `element`.
    pub async fn ancestor(&self, element: &D::Element, tag: &str) -> Option<D::Element> {
        let mut current = self.parent(element).await?;
        loop {
            if self.driver.tag_name(&current).await.ok()? == tag {
                return Some(current);
            }
            current = self.parent(&current).await?;
        }
    }

    /// Scroll the window and give the page a moment to settle.
    pub async fn scroll_to(&self, target: ScrollTarget) {
        if let Err(e) = self.driver.scroll_to(target).await {
            tracing::debug!(?target, error = %e, "scroll failed");
        }
        self.settle(self.timing.settle).await;
    }

    pub async fn page_height(&self) -> Option<u64> {
        match self.driver.page_height().await {
            Ok(height) => Some(height),
            Err(e) => {
                tracing::debug!(error = %e, "cannot read page height");
                None
            }
        }
    }

    pub async fn settle(&self, pause: Duration) {
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}
