use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::blog::POSTS_REMOTE_LIMIT;

/// Default upstream API
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "POSTCACHE_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_api_url")]
  pub base_url: String,
  /// How many upstream posts a load keeps
  #[serde(default = "default_post_limit")]
  pub post_limit: usize,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_api_url(),
      post_limit: default_post_limit(),
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_post_limit() -> usize {
  POSTS_REMOTE_LIMIT
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  /// SQLite database, survives restarts
  #[default]
  Sqlite,
  /// Process memory only
  Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  #[serde(default)]
  pub backend: CacheBackend,
  /// Database file (default: $XDG_DATA_HOME/postcache/cache.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// tracing filter directive, e.g. "postcache=debug"
  pub filter: Option<String>,
  /// Directory for log files (default: $XDG_DATA_HOME/postcache/logs)
  pub dir: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./postcache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/postcache/config.yaml
  ///
  /// Without any file the defaults are used. `POSTCACHE_API_URL` overrides
  /// the API base URL either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_env_overrides(std::env::var(API_URL_ENV).ok()))
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("postcache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("postcache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  /// Parse configuration from YAML text.
  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file is a valid "all defaults" config
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  fn with_env_overrides(mut self, api_url: Option<String>) -> Self {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
      self.api.base_url = url;
    }
    self
  }

  /// Directory holding log files.
  pub fn log_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.log.dir {
      return Ok(dir.clone());
    }

    Ok(data_dir()?.join("logs"))
  }
}

/// Per-user data directory for the cache database and logs.
pub fn data_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("postcache"))
}
