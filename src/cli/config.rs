// ABOUTME: Configuration management for the markup-lite application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub template_root: Option<PathBuf>,

    #[serde(default)]
    pub default_vars: HashMap<String, String>,

    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_cache_timeout_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_root: None,
            default_vars: HashMap::new(),
            cache_timeout_ms: default_cache_timeout_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file()?,
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid configuration in {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<PathBuf> {
        let possible_paths = vec![
            PathBuf::from("markup-lite.yaml"),
            PathBuf::from("markup-lite.yml"),
            PathBuf::from(".markup-lite.yaml"),
            PathBuf::from(".markup-lite.yml"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".markup-lite").join("config.yaml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        for path in possible_paths {
            if path.exists() {
                return Ok(path);
            }
        }

        // Return default path (may not exist)
        Ok(PathBuf::from("markup-lite.yaml"))
    }

    fn merge_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `MARKUP_LITE_*` overrides looked up through `lookup`
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("MARKUP_LITE_TEMPLATE_ROOT") {
            self.template_root = Some(PathBuf::from(root));
        }
        if let Some(timeout) = lookup("MARKUP_LITE_CACHE_TIMEOUT_MS") {
            self.cache_timeout_ms = timeout
                .parse()
                .with_context(|| format!("Invalid MARKUP_LITE_CACHE_TIMEOUT_MS '{}'", timeout))?;
        }
        if let Some(level) = lookup("MARKUP_LITE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MARKUP_LITE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}
