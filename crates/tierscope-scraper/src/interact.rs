//! Clicking, with a script-click fallback for overlays.

use std::time::Duration;

use tierscope_core::Locator;
use tokio::time::Instant;

use crate::driver::Driver;
use crate::error::DriverError;
use crate::locate::Page;

impl<D: Driver> Page<'_, D> {
    /// Find, scroll into view, wait until interactive, click.
    ///
    /// An intercepted click is retried once from page script. Returns `false`
    /// when the element never showed up or both click strategies failed.
    pub async fn click(&self, locator: &Locator, timeout: Duration) -> bool {
        let Some(element) = self.find(locator, None, timeout).await else {
            return false;
        };
        let clicked = self.click_element(&element, timeout).await;
        if !clicked {
            tracing::debug!(%locator, "click failed");
        }
        clicked
    }

    pub async fn click_element(&self, element: &D::Element, timeout: Duration) -> bool {
        if let Err(e) = self.driver.scroll_into_view(element).await {
            tracing::debug!(error = %e, "scroll into view failed");
            if !e.is_lookup() {
                return false;
            }
        }
        if !self.wait_interactive(element, timeout).await {
            return false;
        }
        match self.driver.click(element).await {
            Ok(()) => true,
            Err(DriverError::ClickIntercepted | DriverError::NotInteractable) => {
                tracing::debug!("native click intercepted; using script click");
                match self.driver.script_click(element).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::debug!(error = %e, "script click failed");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "click failed");
                false
            }
        }
    }

    async fn wait_interactive(&self, element: &D::Element, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.driver.is_interactive(element).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "element gone before it became clickable");
                    return false;
                }
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!("element never became clickable");
                return false;
            }
            tokio::time::sleep(self.timing.poll_interval.min(deadline - now)).await;
        }
    }

    /// Close whatever popover is open: click the page body, then press
    /// Escape if the body click did not go through.
    pub async fn dismiss_popover(&self) {
        let body = self
            .find(&self.selectors.page_body, None, self.timing.probe)
            .await;
        let clicked = match body {
            Some(body) => matches!(self.driver.click(&body).await, Ok(())),
            None => false,
        };
        if !clicked {
            if let Err(e) = self.driver.press_escape().await {
                tracing::debug!(error = %e, "escape key failed");
            }
        }
        self.settle(self.timing.settle).await;
    }

    /// Navigate back to `url` if the session drifted away from it, then wait
    /// for the identity landmark. Returns whether the landmark reappeared.
    ///
    /// # Errors
    ///
    /// Session-level driver failures are returned so the orchestrator can
    /// abandon the Target.
    pub async fn return_to(&self, url: &str) -> Result<bool, DriverError> {
        let current = self.driver.current_url().await?;
        if same_page(&current, url) {
            return Ok(true);
        }
        tracing::debug!(from = %current, to = %url, "returning to profile page");
        match self.driver.navigate(url).await {
            Ok(()) => {}
            Err(e @ DriverError::Navigation { .. }) => {
                tracing::warn!(url = %url, error = %e, "could not return to profile page");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
        let back = self
            .exists(&self.selectors.creator_name, self.timing.return_landmark)
            .await;
        if !back {
            tracing::warn!(url = %url, "profile landmark missing after return");
        }
        Ok(back)
    }
}

fn same_page(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
