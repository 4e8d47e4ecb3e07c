use std::path::PathBuf;
use std::str::FromStr;

/// Which browser backend drives page interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// A real browser reached over the WebDriver protocol.
    WebDriver,
    /// Server-rendered HTML fetched over HTTP, no script execution.
    Static,
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverKind::WebDriver => write!(f, "webdriver"),
            DriverKind::Static => write!(f, "static"),
        }
    }
}

impl FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webdriver" => Ok(DriverKind::WebDriver),
            "static" => Ok(DriverKind::Static),
            other => Err(format!("unknown driver '{other}'; expected webdriver or static")),
        }
    }
}

/// What the batch does with a Target whose orchestration failed unexpectedly
/// after the identity landmark had loaded.
///
/// Whole-page failures (landmark never appears) are always skipped,
/// regardless of this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Discard the Target; it contributes no row.
    Drop,
    /// Keep whatever was gathered so far; every other field stays at its default.
    DefaultRow,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Drop => write!(f, "drop"),
            FailurePolicy::DefaultRow => write!(f, "default-row"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(FailurePolicy::Drop),
            "default-row" | "default_row" => Ok(FailurePolicy::DefaultRow),
            other => Err(format!(
                "unknown failure policy '{other}'; expected drop or default-row"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub headless: bool,
    pub max_targets: Option<usize>,
    pub restart_every: usize,
    pub driver: DriverKind,
    pub webdriver_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub failure_policy: FailurePolicy,
    pub skip_without_patrons: bool,
    pub target_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub target_timeout_secs: u64,
    pub selectors_path: Option<PathBuf>,
    pub log_level: String,
}
