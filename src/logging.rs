//! tracing setup. Logs go to a daily rolling file so stdout stays clean.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const DEFAULT_FILTER: &str = "postcache=info";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `log.filter`. The returned guard flushes buffered
/// lines on drop and must live until the process exits.
pub fn init(config: &Config) -> Result<WorkerGuard> {
  let dir = config.log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "postcache.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = build_filter(config.log.filter.as_deref())?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}

fn build_filter(configured: Option<&str>) -> Result<EnvFilter> {
  if let Ok(filter) = EnvFilter::try_from_default_env() {
    return Ok(filter);
  }

  EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER))
    .map_err(|e| eyre!("Invalid log filter: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invalid_filter_is_rejected() {
    if std::env::var("RUST_LOG").is_ok() {
      return;
    }
    assert!(build_filter(Some("postcache=notalevel")).is_err());
    assert!(build_filter(Some("postcache=debug")).is_ok());
    assert!(build_filter(None).is_ok());
  }
}
