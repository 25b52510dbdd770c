use crate::config::Credentials;
use crate::error::{Result, ScraperError};
use crate::portal::PortalDriver;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thirtyfour::prelude::*;
use tracing::{debug, info};

// Element ids on the portal's ASP.NET pages. These move only when the
// vendor redesigns the UI, at which point the whole flow needs re-checking.
const SEL_USERNAME: &str = "#MainContent_UserName";
const SEL_PASSWORD: &str = "#MainContent_Password";
const SEL_LOGIN_BUTTON: &str = "#MainContent_LoginButton";
const SEL_TASKS_TAB: &str = "#TasksTab a";
const SEL_AVAILABLE_COLUMNS: &str = "#AvailableColumns option";
const SEL_ADD_COLUMN: &str = "#AddColumnButton";
const SEL_SELECTED_COLUMNS: &str = "#SelectedColumns option";
const SEL_EXPORT_BUTTON: &str = "#ExportButton";

const DOWNLOAD_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// `PortalDriver` backed by a chromedriver session via thirtyfour.
pub struct WebDriverPortal {
    driver: Option<WebDriver>,
    download_dir: PathBuf,
}

impl WebDriverPortal {
    /// Connect to a running chromedriver and open a maximized window.
    pub async fn connect(server_url: &str, download_dir: &Path) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--start-maximized")
            .map_err(|e| ScraperError::driver("connect", e.to_string()))?;

        let driver = WebDriver::new(server_url, caps)
            .await
            .map_err(|e| ScraperError::driver("connect", e.to_string()))?;
        driver
            .set_implicit_wait_timeout(Duration::from_secs(
                crate::constants::DEFAULT_IMPLICIT_WAIT_SECS,
            ))
            .await
            .map_err(|e| ScraperError::driver("connect", e.to_string()))?;

        Ok(WebDriverPortal {
            driver: Some(driver),
            download_dir: download_dir.to_path_buf(),
        })
    }

    fn session(&self, step: &str) -> Result<&WebDriver> {
        self.driver
            .as_ref()
            .ok_or_else(|| ScraperError::driver(step, "browser session already closed"))
    }

    async fn click(&self, step: &str, selector: &str) -> Result<()> {
        let driver = self.session(step)?;
        let element = driver
            .find(By::Css(selector))
            .await
            .map_err(|e| ScraperError::driver(step, format!("{selector}: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| ScraperError::driver(step, format!("{selector}: {e}")))
    }

    async fn type_into(&self, step: &str, selector: &str, text: &str) -> Result<()> {
        let driver = self.session(step)?;
        let element = driver
            .find(By::Css(selector))
            .await
            .map_err(|e| ScraperError::driver(step, format!("{selector}: {e}")))?;
        element
            .send_keys(text)
            .await
            .map_err(|e| ScraperError::driver(step, format!("{selector}: {e}")))
    }

    /// Newest CSV that landed in the download directory after `since`.
    /// Chrome's in-progress `.crdownload` files are skipped.
    fn landed_export(&self, since: SystemTime) -> Result<Option<PathBuf>> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in std::fs::read_dir(&self.download_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if modified < since {
                continue;
            }
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, path));
            }
        }
        Ok(newest.map(|(_, p)| p))
    }
}

#[async_trait]
impl PortalDriver for WebDriverPortal {
    async fn open_portal(&mut self, base_url: &str) -> Result<()> {
        let driver = self.session("open-login")?;
        driver
            .goto(base_url)
            .await
            .map_err(|e| ScraperError::driver("open-login", e.to_string()))
    }

    async fn sign_in(&mut self, credentials: &Credentials) -> Result<()> {
        self.type_into("sign-in", SEL_USERNAME, &credentials.username)
            .await?;
        self.type_into("sign-in", SEL_PASSWORD, &credentials.password)
            .await?;
        self.click("sign-in", SEL_LOGIN_BUTTON).await
    }

    async fn current_url(&mut self) -> Result<String> {
        let driver = self.session("sign-in")?;
        let url = driver
            .current_url()
            .await
            .map_err(|e| ScraperError::driver("sign-in", e.to_string()))?;
        Ok(url.to_string())
    }

    async fn open_task_report(&mut self) -> Result<()> {
        self.click("open-task-report", SEL_TASKS_TAB).await
    }

    async fn add_export_column(&mut self, column: &str) -> Result<()> {
        let step = "configure-columns";
        let driver = self.session(step)?;

        let options = driver
            .find_all(By::Css(SEL_AVAILABLE_COLUMNS))
            .await
            .map_err(|e| ScraperError::driver(step, e.to_string()))?;
        for option in options {
            let label = option
                .text()
                .await
                .map_err(|e| ScraperError::driver(step, e.to_string()))?;
            if label.trim() == column {
                option
                    .click()
                    .await
                    .map_err(|e| ScraperError::driver(step, e.to_string()))?;
                self.click(step, SEL_ADD_COLUMN).await?;
                debug!("Added export column {column}");
                return Ok(());
            }
        }
        // Already-selected columns disappear from the available list
        debug!("Column {column} not in available list, assuming selected");
        Ok(())
    }

    async fn selected_columns(&mut self) -> Result<Vec<String>> {
        let step = "configure-columns";
        let driver = self.session(step)?;
        let options = driver
            .find_all(By::Css(SEL_SELECTED_COLUMNS))
            .await
            .map_err(|e| ScraperError::driver(step, e.to_string()))?;

        let mut columns = Vec::with_capacity(options.len());
        for option in options {
            let label = option
                .text()
                .await
                .map_err(|e| ScraperError::driver(step, e.to_string()))?;
            columns.push(label.trim().to_string());
        }
        Ok(columns)
    }

    async fn trigger_export(&mut self) -> Result<PathBuf> {
        let started = SystemTime::now();
        self.click("trigger-export", SEL_EXPORT_BUTTON).await?;

        // The step runner bounds this loop with the export wait window.
        loop {
            if let Some(path) = self.landed_export(started)? {
                info!("Export landed at {}", path.display());
                return Ok(path);
            }
            tokio::time::sleep(DOWNLOAD_POLL_INTERVAL).await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver
                .quit()
                .await
                .map_err(|e| ScraperError::driver("close", e.to_string()))?;
        }
        Ok(())
    }
}
