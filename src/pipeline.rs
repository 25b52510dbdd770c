use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::filter::{self, FilterSummary};
use crate::portal::{self, PortalDriver};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub exported_file: String,
    pub filter: FilterSummary,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
}

/// Drive the portal through the declared step plan and hand back the
/// exported file. The browser session is torn down whether or not the plan
/// succeeded.
pub async fn export(
    driver: &mut dyn PortalDriver,
    config: &Config,
    credentials: &Credentials,
) -> Result<PathBuf> {
    info!("🚀 Starting portal export against {}", config.portal.base_url);
    println!("🚀 Starting portal export against {}", config.portal.base_url);

    let outcome = portal::run_plan(driver, config, credentials).await;
    if let Err(e) = driver.close().await {
        error!("Failed to close browser session: {}", e);
    }

    let exported = outcome?;
    info!("✅ Export complete: {}", exported.display());
    println!("✅ Export complete: {}", exported.display());
    Ok(exported)
}

/// Filter an already exported file into the patent and trademark views.
pub fn filter_export(input: &Path, config: &Config) -> Result<FilterSummary> {
    println!("🔧 Filtering {}", input.display());
    let summary = filter::run(input, &config.output.data_dir)?;
    println!(
        "✅ Retained {}/{} rows ({} internal deadlines, {} excluded)",
        summary.retained_rows,
        summary.input_rows,
        summary.internal_deadline_dropped,
        summary.excluded_dropped
    );
    println!("💾 Patent view:    {}", summary.patent_file);
    println!("💾 Trademark view: {}", summary.trademark_file);
    Ok(summary)
}

/// Full run: export then filter. All-or-nothing; a failed step leaves no
/// output files behind because filtering only starts once the export landed.
pub async fn run(
    driver: &mut dyn PortalDriver,
    config: &Config,
    credentials: &Credentials,
) -> Result<PipelineReport> {
    let started_at = Utc::now();
    let timer = std::time::Instant::now();

    let exported = export(driver, config, credentials).await?;
    let summary = filter_export(&exported, config)?;

    Ok(PipelineReport {
        exported_file: exported.to_string_lossy().to_string(),
        filter: summary,
        started_at,
        duration_secs: timer.elapsed().as_secs_f64(),
    })
}
