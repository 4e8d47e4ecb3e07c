use thiserror::Error;

/// Failures surfaced by a [`crate::driver::Driver`] backend.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("element reference is stale")]
    Stale,

    #[error("click intercepted by an overlapping element")]
    ClickIntercepted,

    #[error("element is not interactable")]
    NotInteractable,

    #[error("no element matches {0}")]
    NotFound(String),

    #[error("locator {0} is not supported by this driver")]
    UnsupportedLocator(String),

    #[error("invalid locator {locator}: {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("script execution failed: {0}")]
    Script(String),

    #[error("browser session lost: {0}")]
    SessionLost(String),

    #[error("driver command failed: {0}")]
    Command(String),
}

impl DriverError {
    /// Lookup-class errors mean "treat this element as absent"; everything
    /// else is a session or transport problem.
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            DriverError::Stale
                | DriverError::ClickIntercepted
                | DriverError::NotInteractable
                | DriverError::NotFound(_)
                | DriverError::UnsupportedLocator(_)
                | DriverError::InvalidLocator { .. }
        )
    }
}

/// Failures that end one Target's orchestration early.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("target exceeded its {secs}s time budget")]
    TargetTimeout { secs: u64 },

    #[error("failed to start browser session: {0}")]
    SessionStart(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_class_partition() {
        assert!(DriverError::Stale.is_lookup());
        assert!(DriverError::NotFound("css=h1".into()).is_lookup());
        assert!(DriverError::UnsupportedLocator("xpath=//a".into()).is_lookup());
        assert!(!DriverError::SessionLost("gone".into()).is_lookup());
        assert!(!DriverError::Navigation {
            url: "https://example.test".into(),
            reason: "404".into()
        }
        .is_lookup());
        assert!(!DriverError::Script("boom".into()).is_lookup());
    }
}
