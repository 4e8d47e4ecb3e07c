//! WebDriver backend built on `fantoccini`.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use tierscope_core::Locator;

use super::{Driver, ScrollTarget, SessionFactory};
use crate::error::DriverError;

const SCROLL_INTO_VIEW_JS: &str =
    "arguments[0].scrollIntoView({block: 'center', behavior: 'instant'});";
const CLICK_JS: &str = "arguments[0].click();";
const PAGE_HEIGHT_JS: &str = "return document.body.scrollHeight;";
const ESCAPE_JS: &str = "const target = document.activeElement || document.body; \
     for (const type of ['keydown', 'keyup']) { \
       target.dispatchEvent(new KeyboardEvent(type, {key: 'Escape', code: 'Escape', keyCode: 27, bubbles: true})); \
     }";

/// Opens Chrome sessions against a running WebDriver endpoint
/// (chromedriver, Selenium, ...).
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    webdriver_url: String,
    headless: bool,
    user_agent: String,
}

impl WebDriverFactory {
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>, headless: bool, user_agent: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            user_agent: user_agent.into(),
        }
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec![
            format!("--user-agent={}", self.user_agent),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--window-size=1920,1080".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "prefs": { "intl.accept_languages": "en,en_US" },
            }),
        );
        caps
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Driver = WebDriverSession;

    async fn open(&self) -> Result<WebDriverSession, DriverError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        let client = builder.connect(&self.webdriver_url).await.map_err(|e| {
            DriverError::Command(format!(
                "cannot start session at {}: {e}",
                self.webdriver_url
            ))
        })?;
        tracing::info!(
            webdriver_url = %self.webdriver_url,
            headless = self.headless,
            "browser session started"
        );
        Ok(WebDriverSession { client })
    }
}

/// One live browser session.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    async fn run_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.client
            .execute(script, args)
            .await
            .map_err(map_cmd_error)
    }
}

fn element_arg(element: &Element) -> Result<Value, DriverError> {
    serde_json::to_value(element).map_err(|e| DriverError::Script(e.to_string()))
}

fn to_wd_locator(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Css(expr) | Locator::Tag(expr) => fantoccini::Locator::Css(expr),
        Locator::XPath(expr) => fantoccini::Locator::XPath(expr),
        Locator::Id(expr) => fantoccini::Locator::Id(expr),
    }
}

fn map_cmd_error(err: CmdError) -> DriverError {
    match err {
        CmdError::Standard(e) => match &e.error {
            ErrorStatus::StaleElementReference => DriverError::Stale,
            ErrorStatus::ElementClickIntercepted => DriverError::ClickIntercepted,
            ErrorStatus::ElementNotInteractable => DriverError::NotInteractable,
            ErrorStatus::NoSuchElement => DriverError::NotFound(e.to_string()),
            ErrorStatus::InvalidSelector => DriverError::InvalidLocator {
                locator: String::new(),
                reason: e.to_string(),
            },
            ErrorStatus::InvalidSessionId => DriverError::SessionLost(e.to_string()),
            ErrorStatus::JavascriptError => DriverError::Script(e.to_string()),
            _ => DriverError::Command(e.to_string()),
        },
        CmdError::Lost(e) => DriverError::SessionLost(e.to_string()),
        other => DriverError::Command(other.to_string()),
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(|e| match map_cmd_error(e) {
            lost @ DriverError::SessionLost(_) => lost,
            other => DriverError::Navigation {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(map_cmd_error)
    }

    async fn back(&self) -> Result<(), DriverError> {
        self.client.back().await.map_err(map_cmd_error)
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&Element>,
    ) -> Result<Vec<Element>, DriverError> {
        let wd = to_wd_locator(locator);
        let found = match scope {
            Some(element) => element.find_all(wd).await,
            None => self.client.find_all(wd).await,
        };
        match found {
            Ok(elements) => Ok(elements),
            Err(e) if e.is_no_such_element() => Ok(Vec::new()),
            Err(e) => match map_cmd_error(e) {
                DriverError::InvalidLocator { reason, .. } => Err(DriverError::InvalidLocator {
                    locator: locator.to_string(),
                    reason,
                }),
                other => Err(other),
            },
        }
    }

    async fn parent(&self, element: &Element) -> Result<Option<Element>, DriverError> {
        match element.find(fantoccini::Locator::XPath("..")).await {
            Ok(parent) => Ok(Some(parent)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(map_cmd_error(e)),
        }
    }

    async fn tag_name(&self, element: &Element) -> Result<String, DriverError> {
        element
            .tag_name()
            .await
            .map(|t| t.to_ascii_lowercase())
            .map_err(map_cmd_error)
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        element.text().await.map_err(map_cmd_error)
    }

    async fn text_content(&self, element: &Element) -> Result<String, DriverError> {
        element
            .prop("textContent")
            .await
            .map(Option::unwrap_or_default)
            .map_err(map_cmd_error)
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, DriverError> {
        // The href property is already absolute; the attribute may be relative.
        let value = if name == "href" {
            element.prop(name).await
        } else {
            element.attr(name).await
        };
        value.map_err(map_cmd_error)
    }

    async fn is_interactive(&self, element: &Element) -> Result<bool, DriverError> {
        let displayed = element.is_displayed().await.map_err(map_cmd_error)?;
        if !displayed {
            return Ok(false);
        }
        element.is_enabled().await.map_err(map_cmd_error)
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), DriverError> {
        self.run_script(SCROLL_INTO_VIEW_JS, vec![element_arg(element)?])
            .await
            .map(|_| ())
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await.map_err(map_cmd_error)
    }

    async fn script_click(&self, element: &Element) -> Result<(), DriverError> {
        self.run_script(CLICK_JS, vec![element_arg(element)?])
            .await
            .map(|_| ())
    }

    async fn scroll_to(&self, target: ScrollTarget) -> Result<(), DriverError> {
        let script = match target {
            ScrollTarget::Top => "window.scrollTo(0, 0);",
            ScrollTarget::Bottom => "window.scrollTo(0, document.body.scrollHeight);",
        };
        self.run_script(script, Vec::new()).await.map(|_| ())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn page_height(&self) -> Result<u64, DriverError> {
        let value = self.run_script(PAGE_HEIGHT_JS, Vec::new()).await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
            .ok_or_else(|| DriverError::Script(format!("unexpected page height {value}")))
    }

    async fn press_escape(&self) -> Result<(), DriverError> {
        self.run_script(ESCAPE_JS, Vec::new()).await.map(|_| ())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.client.clone().close().await.map_err(map_cmd_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_include_headless_flag_only_when_headless() {
        let headless = WebDriverFactory::new("http://localhost:9515", true, "ua/1.0").capabilities();
        let args = headless["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--user-agent=ua/1.0"));
        assert_eq!(headless["pageLoadStrategy"], "eager");

        let headed = WebDriverFactory::new("http://localhost:9515", false, "ua/1.0").capabilities();
        let args = headed["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn capabilities_request_english_pages() {
        let caps = WebDriverFactory::new("http://localhost:9515", true, "ua").capabilities();
        assert_eq!(
            caps["goog:chromeOptions"]["prefs"]["intl.accept_languages"],
            "en,en_US"
        );
    }

    #[test]
    fn tag_locators_become_css() {
        let tag = Locator::tag("body");
        assert!(matches!(to_wd_locator(&tag), fantoccini::Locator::Css("body")));
        let id = Locator::id("post-feed-filter-dialog");
        assert!(matches!(
            to_wd_locator(&id),
            fantoccini::Locator::Id("post-feed-filter-dialog")
        ));
    }
}
