//! The browser capability every extractor runs against.
//!
//! Two backends implement [`Driver`]: a WebDriver session driving a real
//! browser, and a static-HTML driver that fetches server-rendered pages over
//! HTTP and answers CSS lookups without executing scripts.

mod static_page;
mod webdriver;

use async_trait::async_trait;
use tierscope_core::Locator;

use crate::error::DriverError;

pub use static_page::{StaticDriver, StaticElement, StaticSessionFactory};
pub use webdriver::{WebDriverFactory, WebDriverSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Bottom,
}

/// Primitive page operations. Element handles are only valid for the page
/// state they were read from; after a re-render a backend reports
/// [`DriverError::Stale`].
#[async_trait]
pub trait Driver: Send + Sync {
    type Element: Clone + Send + Sync + std::fmt::Debug;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn back(&self) -> Result<(), DriverError>;

    /// All matches in document order, searched under `scope` when given.
    /// An empty result is not an error.
    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&Self::Element>,
    ) -> Result<Vec<Self::Element>, DriverError>;

    async fn parent(&self, element: &Self::Element) -> Result<Option<Self::Element>, DriverError>;

    /// Lowercase element name, e.g. `li`.
    async fn tag_name(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// Rendered text, whitespace-collapsed.
    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// Raw `textContent`, including text of hidden descendants.
    async fn text_content(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// `href` is reported resolved against the page URL.
    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Visible and enabled.
    async fn is_interactive(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Dispatch the click from page script, bypassing overlays.
    async fn script_click(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn scroll_to(&self, target: ScrollTarget) -> Result<(), DriverError>;

    async fn page_height(&self) -> Result<u64, DriverError>;

    async fn press_escape(&self) -> Result<(), DriverError>;

    async fn close(&self) -> Result<(), DriverError>;
}

/// Opens fresh driver sessions for the batch runner.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Driver: Driver;

    async fn open(&self) -> Result<Self::Driver, DriverError>;
}
