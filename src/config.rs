//! Runtime configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file, environment variables, and command-line flags.  A missing
//! config file is not an error; a malformed one is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use serde::Deserialize;

use crate::source::{FetchQuery, SortBy};
use crate::store::DEFAULT_KEY;

const DEFAULT_CONFIG_FILE: &str = "headline-tui.toml";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Topic to search for (overrides the config file).
    pub topic: Option<String>,

    /// Path to the TOML config file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding the snapshot and the log file.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// NewsAPI key.
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Settings read from the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub topic: String,
    pub language: String,
    pub sort_by: SortBy,
    /// Fixed lower bound for publication dates.  When absent, the bound is
    /// `lookback_days` before today.
    pub from: Option<NaiveDate>,
    pub lookback_days: u64,
    pub endpoint: String,
    pub data_dir: PathBuf,
    pub snapshot_key: String,
    pub reveal_interval_secs: u64,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: "tesla".into(),
            language: "en".into(),
            sort_by: SortBy::PublishedAt,
            from: None,
            lookback_days: 7,
            endpoint: "https://newsapi.org/v2/everything".into(),
            data_dir: PathBuf::from("."),
            snapshot_key: DEFAULT_KEY.into(),
            reveal_interval_secs: 10,
            timeout_secs: 15,
            api_key: String::new(),
        }
    }
}

impl Config {
    /// Parse a config file.  A file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file named by `cli` and apply the command-line overrides.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = Self::load(&cli.config)?;
        if let Some(topic) = cli.topic {
            config.topic = topic;
        }
        if let Some(dir) = cli.data_dir {
            config.data_dir = dir;
        }
        if let Some(key) = cli.api_key {
            config.api_key = key.trim().to_string();
        }
        Ok(config)
    }

    pub fn query(&self) -> FetchQuery {
        let from = self.from.unwrap_or_else(|| {
            let today = Utc::now().date_naive();
            today.checked_sub_days(Days::new(self.lookback_days)).unwrap_or(today)
        });
        FetchQuery {
            topic: self.topic.clone(),
            from,
            sort_by: self.sort_by,
            language: self.language.clone(),
        }
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_secs(self.reveal_interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("headline-tui.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headline-tui.toml");
        std::fs::write(
            &path,
            r#"
topic = "apple"
sort_by = "popularity"
from = "2024-10-13"
reveal_interval_secs = 3
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.topic, "apple");
        assert_eq!(config.sort_by, SortBy::Popularity);
        assert_eq!(config.from, NaiveDate::from_ymd_opt(2024, 10, 13));
        assert_eq!(config.reveal_interval(), Duration::from_secs(3));
        assert_eq!(config.language, "en");
        assert_eq!(config.snapshot_key, "storedNews");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "topic = [").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headline-tui.toml");
        std::fs::write(&path, "topic = \"apple\"\n").unwrap();

        let cli = Cli::parse_from([
            "headline-tui",
            "rivian",
            "--config",
            path.to_str().unwrap(),
            "--data-dir",
            "/tmp/news",
            "--api-key",
            " abc123 ",
        ]);
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.topic, "rivian");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/news"));
        assert_eq!(config.api_key, "abc123");
    }

    #[test]
    fn query_uses_fixed_lower_bound_when_set() {
        let config = Config {
            from: NaiveDate::from_ymd_opt(2024, 10, 13),
            ..Config::default()
        };
        let query = config.query();
        assert_eq!(query.from, NaiveDate::from_ymd_opt(2024, 10, 13).unwrap());
        assert_eq!(query.topic, "tesla");
        assert_eq!(query.sort_by, SortBy::PublishedAt);
    }

    #[test]
    fn query_falls_back_to_lookback() {
        let config = Config {
            lookback_days: 3,
            ..Config::default()
        };
        let expected = Utc::now().date_naive() - Days::new(3);
        assert_eq!(config.query().from, expected);
    }
}
