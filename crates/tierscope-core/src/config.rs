use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, DriverKind, FailurePolicy};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Does not read `.env` files; the binary loads those once at startup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                invalid(var, format!("'{raw}' is not a boolean (true/false/1/0/yes/no)"))
            }),
            Err(_) => Ok(default),
        }
    };

    let output_dir = PathBuf::from(or_default("TIERSCOPE_OUTPUT_DIR", "output_data"));
    let headless = parse_bool("TIERSCOPE_HEADLESS", true)?;

    let max_targets = match lookup("TIERSCOPE_MAX_TARGETS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<usize>()
                .map_err(|e| invalid("TIERSCOPE_MAX_TARGETS", e.to_string()))?,
        ),
        _ => None,
    };

    let restart_every = parse_usize("TIERSCOPE_RESTART_EVERY", "10")?;
    if restart_every == 0 {
        return Err(invalid(
            "TIERSCOPE_RESTART_EVERY",
            "must be at least 1".to_string(),
        ));
    }

    let driver = DriverKind::from_str(&or_default("TIERSCOPE_DRIVER", "webdriver"))
        .map_err(|reason| invalid("TIERSCOPE_DRIVER", reason))?;
    let webdriver_url = or_default("TIERSCOPE_WEBDRIVER_URL", "http://localhost:9515");
    let user_agent = or_default("TIERSCOPE_USER_AGENT", DEFAULT_USER_AGENT);
    let request_timeout_secs = parse_u64("TIERSCOPE_REQUEST_TIMEOUT_SECS", "30")?;

    let delay_min_ms = parse_u64("TIERSCOPE_DELAY_MIN_MS", "5000")?;
    let delay_max_ms = parse_u64("TIERSCOPE_DELAY_MAX_MS", "10000")?;
    if delay_min_ms > delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "TIERSCOPE_DELAY_MIN_MS ({delay_min_ms}) exceeds TIERSCOPE_DELAY_MAX_MS ({delay_max_ms})"
        )));
    }

    let failure_policy = FailurePolicy::from_str(&or_default("TIERSCOPE_FAILURE_POLICY", "drop"))
        .map_err(|reason| invalid("TIERSCOPE_FAILURE_POLICY", reason))?;
    let skip_without_patrons = parse_bool("TIERSCOPE_SKIP_WITHOUT_PATRONS", false)?;
    let target_retries = parse_u32("TIERSCOPE_TARGET_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("TIERSCOPE_RETRY_BACKOFF_BASE_SECS", "5")?;
    let target_timeout_secs = parse_u64("TIERSCOPE_TARGET_TIMEOUT_SECS", "600")?;

    let selectors_path = lookup("TIERSCOPE_SELECTORS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let log_level = or_default("TIERSCOPE_LOG_LEVEL", "info");

    Ok(AppConfig {
        output_dir,
        headless,
        max_targets,
        restart_every,
        driver,
        webdriver_url,
        user_agent,
        request_timeout_secs,
        delay_min_ms,
        delay_max_ms,
        failure_policy,
        skip_without_patrons,
        target_retries,
        retry_backoff_base_secs,
        target_timeout_secs,
        selectors_path,
        log_level,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
