// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const API_URL_ENV: &str = "CAREER_COMPASS_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Origin the application is served from.
    pub origin: String,
    /// Base URL for every API call. Empty means same-origin.
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub log_file: PathBuf,
    pub timeout_seconds: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_base_url: String::new(),
            storage_path: PathBuf::from(".career-compass"),
            log_file: PathBuf::from(".career-compass/career-compass.log"),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentConfig,
    #[serde(default)]
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Load the section selected by the environment from `config_path`.
    /// A missing file yields the defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml(&content, &environment)?
        } else {
            info!(
                "{} not found, using built-in defaults",
                config_path.display()
            );
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            info!("{} overrides api_base_url", API_URL_ENV);
            config.api_base_url = url;
        }

        Ok(Self {
            storage_path: Self::resolve_path(&config.storage_path)?,
            log_file: Self::resolve_path(&config.log_file)?,
            ..config
        })
    }

    fn get_environment() -> String {
        std::env::var("CAREER_COMPASS_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Base URL used for every request, resolved once. An empty
    /// `api_base_url` falls back to the serving origin.
    pub fn resolved_base_url(&self) -> String {
        let base = if self.api_base_url.trim().is_empty() {
            self.origin.trim()
        } else {
            self.api_base_url.trim()
        };
        base.trim_end_matches('/').to_string()
    }

    /// Ensure the storage directory and the log file's parent exist
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage_path).with_context(|| {
            format!(
                "Failed to create storage directory: {}",
                self.storage_path.display()
            )
        })?;

        if let Some(parent) = self.log_file.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory: {}", parent.display())
            })?;
        }
        Ok(())
    }
}
