//! The `scrape` command: load targets, run the batch, write the output files.

use std::path::Path;

use tierscope_core::{AppConfig, DriverKind, SelectorSet};
use tierscope_scraper::{
    run_batch, BatchOptions, BatchReport, StaticSessionFactory, Timing, WebDriverFactory,
};

use crate::{output, targets};

/// Built-in selectors, or the built-ins with the file's entries applied.
pub(crate) fn resolve_selectors(path: Option<&Path>) -> anyhow::Result<SelectorSet> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading selector overrides");
            Ok(tierscope_core::load_selectors(path)?)
        }
        None => Ok(SelectorSet::default()),
    }
}

/// The static driver cannot evaluate XPath; those lookups always come back
/// empty.
fn warn_static_xpath(selectors: &SelectorSet) {
    let names = selectors.xpath_entries();
    if !names.is_empty() {
        tracing::warn!(
            selectors = %names.join(", "),
            "static driver ignores xpath selectors; override them with css to read these fields"
        );
    }
}

async fn execute(
    config: &AppConfig,
    targets: &[String],
    selectors: &SelectorSet,
) -> anyhow::Result<BatchReport> {
    let timing = Timing::default();
    let options = BatchOptions::from_config(config);
    let report = match config.driver {
        DriverKind::WebDriver => {
            let factory = WebDriverFactory::new(
                config.webdriver_url.as_str(),
                config.headless,
                config.user_agent.as_str(),
            );
            run_batch(&factory, targets, selectors, &timing, &options).await?
        }
        DriverKind::Static => {
            warn_static_xpath(selectors);
            let factory =
                StaticSessionFactory::new(config.request_timeout_secs, config.user_agent.as_str());
            run_batch(&factory, targets, selectors, &timing, &options).await?
        }
    };
    Ok(report)
}

/// # Errors
///
/// Returns an error if the targets file or selector overrides cannot be
/// read, the first browser session cannot be opened, or an output file
/// cannot be written. Individual Target failures are logged and skipped.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    targets_file: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let targets = targets::load_targets(targets_file)?;
    if targets.is_empty() {
        anyhow::bail!("no target URLs in {}", targets_file.display());
    }
    let selectors = resolve_selectors(config.selectors_path.as_deref())?;

    tracing::info!(
        targets = targets.len(),
        driver = %config.driver,
        headless = config.headless,
        failure_policy = %config.failure_policy,
        "starting scrape"
    );

    let report = execute(config, &targets, &selectors).await?;
    let stamp = output::timestamp();

    let Some(csv_path) = output::write_csv(&config.output_dir, &report.records, &stamp)? else {
        println!(
            "no records gathered ({} attempted, {} skipped) in {}s; nothing written",
            report.attempted,
            report.skipped.len(),
            report.elapsed.as_secs()
        );
        return Ok(());
    };
    if json {
        let json_path = output::write_json(&config.output_dir, &report.records, &stamp)?;
        println!("json: {}", json_path.display());
    }

    for (url, reason) in &report.skipped {
        tracing::info!(url = %url, reason = %reason, "skipped");
    }
    println!(
        "wrote {} rows to {} ({} attempted, {} skipped) in {}s",
        report.succeeded(),
        csv_path.display(),
        report.attempted,
        report.skipped.len(),
        report.elapsed.as_secs()
    );
    Ok(())
}
