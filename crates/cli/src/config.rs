use anyhow::{Context, Result};
use depcache::{RetryPolicy, DEFAULT_CACHE_FILE};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{DEFAULT_DUPS_DIR, DEFAULT_EXTENSION};

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("javamodel")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("javamodel")
}

fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

fn default_retry_attempts() -> u32 {
    RetryPolicy::default().attempts
}

fn default_retry_delay_ms() -> u64 {
    RetryPolicy::default().delay.as_millis() as u64
}

fn default_stale_lock_secs() -> u64 {
    RetryPolicy::default().stale_after.as_secs()
}

/// Shared dependency cache settings.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file name inside the output directory.
    #[serde(default = "default_cache_file")]
    pub file_name: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_stale_lock_secs")]
    pub stale_lock_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file_name: default_cache_file(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            stale_lock_secs: default_stale_lock_secs(),
        }
    }
}

impl CacheConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
            stale_after: Duration::from_secs(self.stale_lock_secs),
        }
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_dups_dir() -> String {
    DEFAULT_DUPS_DIR.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_dups_dir")]
    pub dups_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            dups_dir: default_dups_dir(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config")
    } else {
        Ok(Config::default())
    }
}
