use crate::config::{Config, Credentials};
use crate::constants;
use crate::error::{Result, ScraperError};
use crate::portal::PortalDriver;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// How often a step may be re-invoked after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-invocations after the first attempt.
    pub retries: u32,
    /// Fixed pause before each re-invocation.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy {
        retries: 0,
        backoff: Duration::ZERO,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    OpenLogin,
    SignIn,
    OpenTaskReport,
    ConfigureColumns,
    TriggerExport,
}

/// One named portal action with its declared wait window and retry policy.
#[derive(Debug, Clone)]
pub struct Step {
    pub kind: StepKind,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self.kind {
            StepKind::OpenLogin => "open-login",
            StepKind::SignIn => "sign-in",
            StepKind::OpenTaskReport => "open-task-report",
            StepKind::ConfigureColumns => "configure-columns",
            StepKind::TriggerExport => "trigger-export",
        }
    }
}

/// The full portal run as declared data. Timeouts come from config; the one
/// retry on `configure-columns` matches the stale-element behavior the
/// portal shows when the column list re-renders mid-click.
pub fn step_plan(config: &Config) -> Vec<Step> {
    let element = Duration::from_secs(config.portal.element_wait_secs);
    let redirect = Duration::from_secs(config.portal.redirect_wait_secs);
    let export = Duration::from_secs(config.portal.export_wait_secs);

    vec![
        Step {
            kind: StepKind::OpenLogin,
            timeout: redirect,
            retry: RetryPolicy::NONE,
        },
        Step {
            kind: StepKind::SignIn,
            timeout: element,
            retry: RetryPolicy::NONE,
        },
        Step {
            kind: StepKind::OpenTaskReport,
            timeout: element,
            retry: RetryPolicy::NONE,
        },
        Step {
            kind: StepKind::ConfigureColumns,
            timeout: element,
            retry: RetryPolicy {
                retries: 1,
                backoff: Duration::from_secs(1),
            },
        },
        Step {
            kind: StepKind::TriggerExport,
            timeout: export,
            retry: RetryPolicy::NONE,
        },
    ]
}

async fn execute_step(
    step: &Step,
    driver: &mut dyn PortalDriver,
    config: &Config,
    credentials: &Credentials,
) -> Result<Option<PathBuf>> {
    match step.kind {
        StepKind::OpenLogin => {
            driver.open_portal(&config.portal.base_url).await?;
            Ok(None)
        }
        StepKind::SignIn => {
            driver.sign_in(credentials).await?;
            // Post-condition: the portal redirected us inside the app
            // instead of bouncing back to the login form.
            let url = driver.current_url().await?;
            if !url.starts_with(&config.portal.base_url) || url.contains("Login") {
                return Err(ScraperError::UnexpectedState {
                    step: step.name().to_string(),
                    detail: format!("still on '{url}' after submitting credentials"),
                });
            }
            Ok(None)
        }
        StepKind::OpenTaskReport => {
            driver.open_task_report().await?;
            Ok(None)
        }
        StepKind::ConfigureColumns => {
            for column in constants::EXPORT_COLUMNS {
                driver.add_export_column(column).await?;
            }
            // Post-condition: every required column made it into the set.
            let selected = driver.selected_columns().await?;
            for column in constants::EXPORT_COLUMNS {
                if !selected.iter().any(|c| c == column) {
                    return Err(ScraperError::UnexpectedState {
                        step: step.name().to_string(),
                        detail: format!("column '{column}' missing from selected set"),
                    });
                }
            }
            Ok(None)
        }
        StepKind::TriggerExport => {
            let path = driver.trigger_export().await?;
            Ok(Some(path))
        }
    }
}

/// Run the declared plan sequentially against a driver, returning the path
/// of the exported file. Any step failure aborts the whole run.
pub async fn run_plan(
    driver: &mut dyn PortalDriver,
    config: &Config,
    credentials: &Credentials,
) -> Result<PathBuf> {
    let mut exported: Option<PathBuf> = None;

    for step in step_plan(config) {
        info!("▶️  Step {}", step.name());
        let mut attempt = 0u32;
        loop {
            let outcome = tokio::time::timeout(
                step.timeout,
                execute_step(&step, driver, config, credentials),
            )
            .await;

            match outcome {
                Ok(Ok(path)) => {
                    if path.is_some() {
                        exported = path;
                    }
                    info!("✅ Step {} done", step.name());
                    break;
                }
                Ok(Err(e)) if attempt < step.retry.retries => {
                    attempt += 1;
                    warn!(
                        "Step {} failed ({}), retry {}/{}",
                        step.name(),
                        e,
                        attempt,
                        step.retry.retries
                    );
                    tokio::time::sleep(step.retry.backoff).await;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    return Err(ScraperError::Timeout {
                        step: step.name().to_string(),
                        timeout_secs: step.timeout.as_secs(),
                    })
                }
            }
        }
    }

    exported.ok_or_else(|| ScraperError::UnexpectedState {
        step: "trigger-export".to_string(),
        detail: "plan finished without an exported file".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, PortalConfig};

    fn test_config() -> Config {
        Config {
            portal: PortalConfig {
                base_url: "https://www.appcoll.com/".to_string(),
                download_dir: PathBuf::from("downloads"),
                element_wait_secs: 30,
                redirect_wait_secs: 120,
                export_wait_secs: 120,
            },
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn plan_covers_the_whole_session_in_order() {
        let plan = step_plan(&test_config());
        let kinds: Vec<StepKind> = plan.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::OpenLogin,
                StepKind::SignIn,
                StepKind::OpenTaskReport,
                StepKind::ConfigureColumns,
                StepKind::TriggerExport,
            ]
        );
    }

    #[test]
    fn only_column_configuration_retries() {
        for step in step_plan(&test_config()) {
            if step.kind == StepKind::ConfigureColumns {
                assert_eq!(step.retry.retries, 1);
            } else {
                assert_eq!(step.retry, RetryPolicy::NONE, "step {}", step.name());
            }
        }
    }

    #[test]
    fn timeouts_follow_config() {
        let mut config = test_config();
        config.portal.element_wait_secs = 7;
        config.portal.redirect_wait_secs = 11;
        config.portal.export_wait_secs = 13;

        let plan = step_plan(&config);
        assert_eq!(plan[0].timeout, Duration::from_secs(11));
        assert_eq!(plan[1].timeout, Duration::from_secs(7));
        assert_eq!(plan[4].timeout, Duration::from_secs(13));
    }
}
