mod output;
mod run;
mod targets;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tierscope_core::{AppConfig, DriverKind, FailurePolicy};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tierscope")]
#[command(about = "Scrape creator profile pages into a CSV of membership metrics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every profile URL listed in a file
    Scrape(ScrapeArgs),
    /// Print the effective selector set as YAML
    Selectors {
        /// YAML file overriding individual selectors
        #[arg(long)]
        selectors: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct ScrapeArgs {
    /// One profile URL per line; blank lines and `#` comments are ignored
    targets_file: PathBuf,

    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, conflicts_with = "headed")]
    headless: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    #[arg(long)]
    max_targets: Option<usize>,

    /// Reopen the browser after this many profiles
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    restart_every: Option<u64>,

    /// webdriver or static
    #[arg(long)]
    driver: Option<DriverKind>,

    #[arg(long)]
    webdriver_url: Option<String>,

    /// YAML file overriding individual selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// drop or default-row
    #[arg(long)]
    failure_policy: Option<FailurePolicy>,

    /// Also write the records as a JSON array
    #[arg(long)]
    json: bool,
}

impl ScrapeArgs {
    /// Flags win over environment configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.out_dir {
            config.output_dir.clone_from(dir);
        }
        if self.headless {
            config.headless = true;
        }
        if self.headed {
            config.headless = false;
        }
        if self.max_targets.is_some() {
            config.max_targets = self.max_targets;
        }
        if let Some(n) = self.restart_every {
            config.restart_every = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(driver) = self.driver {
            config.driver = driver;
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url.clone_from(url);
        }
        if let Some(path) = &self.selectors {
            config.selectors_path = Some(path.clone());
        }
        if let Some(policy) = self.failure_policy {
            config.failure_policy = policy;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = tierscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Scrape(args) => {
            args.apply(&mut config);
            run::run_scrape(&config, &args.targets_file, args.json).await
        }
        Commands::Selectors { selectors } => {
            let path = selectors.or(config.selectors_path);
            let set = run::resolve_selectors(path.as_deref())?;
            print!("{}", set.to_yaml()?);
            Ok(())
        }
    }
}
