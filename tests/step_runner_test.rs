use anyhow::Result;
use appcoll_scraper::config::{Config, Credentials, OutputConfig, PortalConfig};
use appcoll_scraper::constants;
use appcoll_scraper::error::ScraperError;
use appcoll_scraper::portal::{run_plan, PortalDriver};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

fn test_config() -> Config {
    Config {
        portal: PortalConfig {
            base_url: "https://www.appcoll.com/".to_string(),
            download_dir: PathBuf::from("downloads"),
            element_wait_secs: 30,
            redirect_wait_secs: 30,
            export_wait_secs: 30,
        },
        output: OutputConfig::default(),
    }
}

fn test_credentials() -> Credentials {
    Credentials {
        username: "paralegal@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

/// In-memory driver that records the call sequence, in the spirit of the
/// portal session: columns added through the UI show up in the selected set.
struct ScriptedDriver {
    calls: Vec<String>,
    selected: Vec<String>,
    post_login_url: String,
    add_column_failures: usize,
    report_delay: Duration,
    closed: bool,
}

impl ScriptedDriver {
    fn new() -> Self {
        ScriptedDriver {
            calls: Vec::new(),
            selected: Vec::new(),
            post_login_url: "https://www.appcoll.com/Tasks.aspx".to_string(),
            add_column_failures: 0,
            report_delay: Duration::ZERO,
            closed: false,
        }
    }
}

#[async_trait]
impl PortalDriver for ScriptedDriver {
    async fn open_portal(&mut self, base_url: &str) -> appcoll_scraper::error::Result<()> {
        self.calls.push(format!("open:{base_url}"));
        Ok(())
    }

    async fn sign_in(&mut self, credentials: &Credentials) -> appcoll_scraper::error::Result<()> {
        self.calls.push(format!("sign_in:{}", credentials.username));
        Ok(())
    }

    async fn current_url(&mut self) -> appcoll_scraper::error::Result<String> {
        Ok(self.post_login_url.clone())
    }

    async fn open_task_report(&mut self) -> appcoll_scraper::error::Result<()> {
        tokio::time::sleep(self.report_delay).await;
        self.calls.push("open_task_report".to_string());
        Ok(())
    }

    async fn add_export_column(&mut self, column: &str) -> appcoll_scraper::error::Result<()> {
        if self.add_column_failures > 0 {
            self.add_column_failures -= 1;
            return Err(ScraperError::driver(
                "configure-columns",
                "stale element reference",
            ));
        }
        self.calls.push(format!("add:{column}"));
        if !self.selected.iter().any(|c| c == column) {
            self.selected.push(column.to_string());
        }
        Ok(())
    }

    async fn selected_columns(&mut self) -> appcoll_scraper::error::Result<Vec<String>> {
        Ok(self.selected.clone())
    }

    async fn trigger_export(&mut self) -> appcoll_scraper::error::Result<PathBuf> {
        self.calls.push("export".to_string());
        Ok(PathBuf::from("downloads/tasks.csv"))
    }

    async fn close(&mut self) -> appcoll_scraper::error::Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[tokio::test]
async fn plan_runs_steps_in_order_and_returns_export_path() -> Result<()> {
    let config = test_config();
    let mut driver = ScriptedDriver::new();

    let exported = run_plan(&mut driver, &config, &test_credentials()).await?;
    assert_eq!(exported, PathBuf::from("downloads/tasks.csv"));

    assert_eq!(driver.calls[0], "open:https://www.appcoll.com/");
    assert_eq!(driver.calls[1], "sign_in:paralegal@example.com");
    assert_eq!(driver.calls[2], "open_task_report");
    assert_eq!(driver.calls.last().unwrap(), "export");

    // Every required export column went through the column-config UI
    for column in constants::EXPORT_COLUMNS {
        assert!(driver.calls.contains(&format!("add:{column}")), "{column}");
    }

    // Session teardown is the caller's job, not the plan's
    assert!(!driver.closed);
    Ok(())
}

#[tokio::test]
async fn pipeline_export_closes_the_session() -> Result<()> {
    let config = test_config();
    let mut driver = ScriptedDriver::new();

    let exported =
        appcoll_scraper::pipeline::export(&mut driver, &config, &test_credentials()).await?;
    assert_eq!(exported, PathBuf::from("downloads/tasks.csv"));
    assert!(driver.closed);
    Ok(())
}

#[tokio::test]
async fn stale_column_click_is_retried_once() -> Result<()> {
    let config = test_config();
    let mut driver = ScriptedDriver::new();
    driver.add_column_failures = 1;

    let exported = run_plan(&mut driver, &config, &test_credentials()).await?;
    assert_eq!(exported, PathBuf::from("downloads/tasks.csv"));
    Ok(())
}

#[tokio::test]
async fn repeated_column_failures_abort_the_run() {
    let config = test_config();
    let mut driver = ScriptedDriver::new();
    // First attempt plus the single retry both fail
    driver.add_column_failures = constants::EXPORT_COLUMNS.len() + 2;

    let result = run_plan(&mut driver, &config, &test_credentials()).await;
    assert!(matches!(result, Err(ScraperError::Driver { .. })));
    assert!(!driver.calls.contains(&"export".to_string()));
}

#[tokio::test]
async fn bounced_login_is_an_unexpected_state() {
    let config = test_config();
    let mut driver = ScriptedDriver::new();
    driver.post_login_url = "https://www.appcoll.com/Login.aspx?failed=1".to_string();

    let result = run_plan(&mut driver, &config, &test_credentials()).await;
    match result {
        Err(ScraperError::UnexpectedState { step, .. }) => assert_eq!(step, "sign-in"),
        other => panic!("expected UnexpectedState, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_step_times_out() {
    let mut config = test_config();
    config.portal.element_wait_secs = 1;
    let mut driver = ScriptedDriver::new();
    driver.report_delay = Duration::from_secs(3);

    let result = run_plan(&mut driver, &config, &test_credentials()).await;
    match result {
        Err(ScraperError::Timeout { step, timeout_secs }) => {
            assert_eq!(step, "open-task-report");
            assert_eq!(timeout_secs, 1);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}
