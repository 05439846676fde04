// src/core/config_manager.rs
//! Configuration loading: `config.yaml` per environment plus env overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::FsOps;
use crate::swipe::DEFAULT_SWIPE_THRESHOLD;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 120;
const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub storage_path: PathBuf,
    /// Base URL under which stored files are publicly reachable.
    pub public_base_url: String,
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub swipe: SwipeConfig,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub url: String,
    #[serde(default = "default_analysis_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SwipeConfig {
    pub threshold: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SWIPE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            audience: default_audience(),
            issuer: None,
        }
    }
}

fn default_analysis_timeout() -> u64 {
    DEFAULT_ANALYSIS_TIMEOUT_SECS
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

impl ConfigManager {
    /// Load `config.yaml` (or `$JOBSTER_CONFIG`) for the current environment.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = std::env::var("JOBSTER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !config_path.exists() {
            anyhow::bail!(
                "{} not found. Server cannot start without configuration.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        let mut config = Self::from_yaml_str(&content, &environment, &base_dir)?;

        if let Ok(url) = std::env::var("ANALYSIS_SERVICE_URL") {
            info!("Analysis service URL overridden from environment");
            config.environment.analysis.url = url;
        }

        Ok(config)
    }

    /// Parse a config document and pick one environment section.
    pub fn from_yaml_str(content: &str, environment: &str, base_dir: &Path) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse configuration")?;

        let env_config = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        let env_config = EnvironmentConfig {
            database_path: Self::resolve_path(base_dir, &env_config.database_path),
            storage_path: Self::resolve_path(base_dir, &env_config.storage_path),
            public_base_url: env_config.public_base_url.trim_end_matches('/').to_string(),
            analysis: AnalysisConfig {
                url: env_config.analysis.url.trim_end_matches('/').to_string(),
                ..env_config.analysis
            },
            ..env_config
        };

        Self::validate(&env_config)?;

        Ok(Self {
            environment_name: environment.to_string(),
            environment: env_config,
        })
    }

    fn get_environment() -> String {
        std::env::var("JOBSTER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn resolve_path(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    fn validate(config: &EnvironmentConfig) -> Result<()> {
        let threshold = config.swipe.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            anyhow::bail!(
                "swipe.threshold must be a finite, non-negative number (got {})",
                threshold
            );
        }
        if config.analysis.timeout_seconds == 0 {
            anyhow::bail!("analysis.timeout_seconds must be greater than zero");
        }
        if config.analysis.url.is_empty() {
            anyhow::bail!("analysis.url must not be empty");
        }
        Ok(())
    }

    /// Ensure storage and database directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.environment.storage_path).await?;

        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }

        info!("All configured directories ensured to exist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  database_path: data/jobster.db
  storage_path: data/storage
  public_base_url: http://localhost:8000/api/files/
  analysis:
    url: http://127.0.0.1:54321/functions/v1/
  swipe:
    threshold: 80
production:
  database_path: /var/lib/jobster/jobster.db
  storage_path: /var/lib/jobster/storage
  public_base_url: https://jobster.example/api/files
  analysis:
    url: https://functions.example/v1
    timeout_seconds: 30
  auth:
    audience: authenticated
    issuer: https://auth.example/auth/v1
"#;

    #[test]
    fn test_local_section_resolves_relative_paths() {
        let config = ConfigManager::from_yaml_str(SAMPLE, "local", Path::new("/srv/app")).unwrap();
        let env = &config.environment;

        assert_eq!(env.database_path, PathBuf::from("/srv/app/data/jobster.db"));
        assert_eq!(env.storage_path, PathBuf::from("/srv/app/data/storage"));
        assert_eq!(env.public_base_url, "http://localhost:8000/api/files");
        assert_eq!(env.analysis.url, "http://127.0.0.1:54321/functions/v1");
        assert_eq!(env.analysis.timeout_seconds, DEFAULT_ANALYSIS_TIMEOUT_SECS);
        assert_eq!(env.swipe.threshold, 80.0);
        assert_eq!(env.auth.audience, "authenticated");
        assert!(env.auth.issuer.is_none());
    }

    #[test]
    fn test_production_section() {
        let config =
            ConfigManager::from_yaml_str(SAMPLE, "production", Path::new("/srv/app")).unwrap();
        let env = &config.environment;

        assert_eq!(config.environment_name, "production");
        assert_eq!(env.database_path, PathBuf::from("/var/lib/jobster/jobster.db"));
        assert_eq!(env.swipe.threshold, DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(env.analysis.timeout_seconds, 30);
        assert_eq!(env.auth.issuer.as_deref(), Some("https://auth.example/auth/v1"));
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let bad = SAMPLE.replace("threshold: 80", "threshold: -5");
        let err = ConfigManager::from_yaml_str(&bad, "local", Path::new("/")).unwrap_err();
        assert!(err.to_string().contains("swipe.threshold"));
    }

    #[test]
    fn test_missing_section_fails() {
        assert!(ConfigManager::from_yaml_str("local: {}", "local", Path::new("/")).is_err());
    }
}
