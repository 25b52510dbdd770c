use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use appcoll_scraper::config::Config;
use appcoll_scraper::error::Result;
use appcoll_scraper::portal::step_plan;
use appcoll_scraper::{logging, pipeline};

#[derive(Parser)]
#[command(name = "appcoll_scraper")]
#[command(about = "AppColl task export and filtering pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter an already exported task file into the two output views
    Filter {
        /// Path to the exported CSV
        #[arg(long)]
        input: PathBuf,
        /// Print the filter summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drive the portal and download a fresh export (needs the `webdriver` feature)
    Export {
        /// chromedriver endpoint
        #[arg(long, default_value = "http://localhost:9515")]
        webdriver_url: String,
    },
    /// Run export and filter sequentially
    Run {
        /// chromedriver endpoint
        #[arg(long, default_value = "http://localhost:9515")]
        webdriver_url: String,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the declared portal step plan
    Plan,
}

#[cfg(feature = "webdriver")]
async fn connect_driver(
    webdriver_url: &str,
    config: &Config,
) -> Result<appcoll_scraper::portal::webdriver::WebDriverPortal> {
    appcoll_scraper::portal::webdriver::WebDriverPortal::connect(
        webdriver_url,
        &config.portal.download_dir,
    )
    .await
}

#[cfg(not(feature = "webdriver"))]
fn webdriver_unavailable() -> appcoll_scraper::error::ScraperError {
    appcoll_scraper::error::ScraperError::Config(
        "this build has no portal driver; rebuild with --features webdriver".to_string(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let outcome = dispatch(cli).await;
    if let Err(e) = &outcome {
        error!("Run failed: {}", e);
        println!("❌ Run failed: {}", e);
    }
    outcome
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Filter { input, json } => {
            let config = Config::load(&cli.config)?;
            let summary = pipeline::filter_export(&input, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Ok(())
        }
        Commands::Export { webdriver_url } => {
            let config = Config::load(&cli.config)?;
            let credentials = appcoll_scraper::config::Credentials::from_env()?;
            #[cfg(feature = "webdriver")]
            {
                let mut driver = connect_driver(&webdriver_url, &config).await?;
                pipeline::export(&mut driver, &config, &credentials).await?;
                Ok(())
            }
            #[cfg(not(feature = "webdriver"))]
            {
                let _ = (webdriver_url, credentials, config);
                Err(webdriver_unavailable())
            }
        }
        Commands::Run { webdriver_url, json } => {
            let config = Config::load(&cli.config)?;
            let credentials = appcoll_scraper::config::Credentials::from_env()?;
            #[cfg(feature = "webdriver")]
            {
                let mut driver = connect_driver(&webdriver_url, &config).await?;
                let report = pipeline::run(&mut driver, &config, &credentials).await?;
                println!("✅ Full pipeline completed in {:.1}s", report.duration_secs);
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Ok(())
            }
            #[cfg(not(feature = "webdriver"))]
            {
                let _ = (webdriver_url, credentials, json, config);
                Err(webdriver_unavailable())
            }
        }
        Commands::Plan => {
            let config = Config::load(&cli.config)?;
            println!("Portal step plan:");
            for step in step_plan(&config) {
                println!(
                    "  {:<18} timeout {:>4}s  retries {}",
                    step.name(),
                    step.timeout.as_secs(),
                    step.retry.retries
                );
            }
            Ok(())
        }
    }
}
