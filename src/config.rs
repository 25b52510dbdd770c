use crate::constants;
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct PortalConfig {
    pub base_url: String,
    /// Directory the browser drops the exported file into.
    pub download_dir: PathBuf,
    #[serde(default = "default_element_wait")]
    pub element_wait_secs: u64,
    #[serde(default = "default_redirect_wait")]
    pub redirect_wait_secs: u64,
    #[serde(default = "default_export_wait")]
    pub export_wait_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            data_dir: default_data_dir(),
        }
    }
}

fn default_element_wait() -> u64 {
    constants::DEFAULT_ELEMENT_WAIT_SECS
}

fn default_redirect_wait() -> u64 {
    constants::DEFAULT_REDIRECT_WAIT_SECS
}

fn default_export_wait() -> u64 {
    constants::DEFAULT_EXPORT_WAIT_SECS
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Startup validation; every problem found here would otherwise only
    /// surface mid-run, after the browser is already logged in.
    pub fn validate(&self) -> Result<()> {
        if !self.portal.base_url.starts_with("http") {
            return Err(ScraperError::Config(format!(
                "portal.base_url must be an http(s) URL, got '{}'",
                self.portal.base_url
            )));
        }
        if self.portal.element_wait_secs == 0
            || self.portal.redirect_wait_secs == 0
            || self.portal.export_wait_secs == 0
        {
            return Err(ScraperError::Config(
                "portal wait windows must be non-zero".to_string(),
            ));
        }
        if self.portal.download_dir.as_os_str().is_empty() {
            return Err(ScraperError::Config(
                "portal.download_dir must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Portal sign-in credentials, supplied through the environment rather than
/// the config file so they never land on disk next to the code.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("APPCOLL_USERNAME")
            .map_err(|_| ScraperError::Config("APPCOLL_USERNAME is not set".to_string()))?;
        let password = std::env::var("APPCOLL_PASSWORD")
            .map_err(|_| ScraperError::Config("APPCOLL_PASSWORD is not set".to_string()))?;
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ScraperError::Config(
                "portal credentials must not be empty".to_string(),
            ));
        }
        Ok(Credentials { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(base_url: &str) -> Config {
        Config {
            portal: PortalConfig {
                base_url: base_url.to_string(),
                download_dir: PathBuf::from("downloads"),
                element_wait_secs: default_element_wait(),
                redirect_wait_secs: default_redirect_wait(),
                export_wait_secs: default_export_wait(),
            },
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn accepts_https_base_url() {
        assert!(base_config("https://www.appcoll.com/").validate().is_ok());
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(base_config("ftp://example.com").validate().is_err());
    }

    #[test]
    fn rejects_zero_wait_window() {
        let mut config = base_config("https://www.appcoll.com/");
        config.portal.element_wait_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn credentials_come_from_the_environment() {
        // One test owns both env vars so parallel runs cannot interleave
        std::env::remove_var("APPCOLL_USERNAME");
        std::env::remove_var("APPCOLL_PASSWORD");
        match Credentials::from_env() {
            Err(ScraperError::Config(msg)) => assert!(msg.contains("APPCOLL_USERNAME")),
            other => panic!("expected Config error, got {other:?}"),
        }

        std::env::set_var("APPCOLL_USERNAME", "paralegal@example.com");
        std::env::set_var("APPCOLL_PASSWORD", " ");
        assert!(matches!(
            Credentials::from_env(),
            Err(ScraperError::Config(_))
        ));

        std::env::set_var("APPCOLL_PASSWORD", "hunter2");
        let credentials = Credentials::from_env().unwrap();
        assert_eq!(credentials.username, "paralegal@example.com");

        std::env::remove_var("APPCOLL_USERNAME");
        std::env::remove_var("APPCOLL_PASSWORD");
    }

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let config: Config = toml::from_str(
            "[portal]\nbase_url = \"https://www.appcoll.com/\"\ndownload_dir = \"downloads\"\n",
        )
        .unwrap();
        assert_eq!(config.portal.element_wait_secs, 30);
        assert_eq!(config.portal.redirect_wait_secs, 120);
        assert_eq!(config.output.data_dir, PathBuf::from("data"));
    }
}
