use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ISSUES_FILE: &str = "github_issues_data.json";
pub const ANALYSIS_FILE: &str = "analysis_report.json";
pub const WEB_FILE: &str = "web_app_data.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("repository must look like owner/name, got {0:?}")]
    BadRepository(String),
}

/// Owner and name of the tracked repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigError::BadRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub repository: String,
    pub target_user: String,
    pub api_base_url: String,
    pub per_page: u32,
    pub page_delay_ms: u64,
    pub output_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repository: "stacksgov/sip31-interim-grants".into(),
            target_user: "cuevasm".into(),
            api_base_url: "https://api.github.com".into(),
            per_page: 100,
            page_delay_ms: 100,
            output_dir: None,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    pub fn repo(&self) -> Result<RepoRef, ConfigError> {
        self.repository.parse()
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::in_dir(self.output_dir.clone().unwrap_or_else(data_dir))
    }

    /// API token for the tracker, if one is exported.
    pub fn token() -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Fixed file locations shared by the three stages.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub issues: PathBuf,
    pub analysis: PathBuf,
    pub web: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            issues: dir.join(ISSUES_FILE),
            analysis: dir.join(ANALYSIS_FILE),
            web: dir.join(WEB_FILE),
        }
    }
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".issue-digest")
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig =
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")?;
    config.repo()?;
    Ok(config)
}
