//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.adstats.toml` files.

use crate::cli::OutputFormat;
use crate::models::Limits;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".adstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Render-time truncation.
    #[serde(default)]
    pub limits: Limits,

    /// Registered data sources, in registration order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            fetch: FetchConfig::default(),
            limits: Limits::default(),
            sources: default_sources(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Country to render; empty renders every country.
    #[serde(default)]
    pub country: String,

    /// Output file path; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("adstats/{}", env!("CARGO_PKG_VERSION"))
}

/// A single data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source identifier, usually a country code.
    pub id: String,
    /// URL or local file path of the listing feed.
    pub url: String,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            id: "NG".to_string(),
            url: "http://api-v2.olx.com/items?seo=false&abundance=true&languageId=1&pageSize=1&location=www.olx.com.ng&offset=0&platform=desktop".to_string(),
        },
        SourceConfig {
            id: "UG".to_string(),
            url: "http://api-v2.olx.com/items?seo=false&abundance=true&languageId=1&pageSize=1&location=www.olx.co.ug&offset=0&platform=desktop".to_string(),
        },
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, and only
    /// when they were explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if !args.sources.is_empty() {
            self.sources = args
                .sources
                .iter()
                .map(|(id, url)| SourceConfig {
                    id: id.clone(),
                    url: url.clone(),
                })
                .collect();
        }

        if let Some(ref country) = args.country {
            self.general.country = country.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }

        if let Some(max_states) = args.max_states {
            self.limits.max_states = max_states;
        }
        if let Some(max_categories) = args.max_categories {
            self.limits.max_categories = max_categories;
        }

        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.format, OutputFormat::Json);
        assert!(config.general.country.is_empty());
        assert_eq!(config.limits, Limits::unlimited());
        assert_eq!(config.fetch.timeout_seconds, 30);
        let ids: Vec<_> = config.sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["NG", "UG"]);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
format = "csv"
country = "KE"

[limits]
max_states = 3

[[sources]]
id = "KE"
url = "https://api.example.com/ke"

[[sources]]
id = "GH"
url = "./fixtures/gh.json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.format, OutputFormat::Csv);
        assert_eq!(config.general.country, "KE");
        assert_eq!(config.limits.max_states, 3);
        assert_eq!(config.limits.max_categories, 0);
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].id, "KE");
        assert_eq!(config.sources[1].url, "./fixtures/gh.json");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\ntimeout_seconds = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.fetch.timeout_seconds, 5);
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\nmax_states = -2").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::try_parse_from([
            "adstats",
            "--source",
            "KE=./ke.json",
            "--format",
            "csv",
            "--max-categories",
            "2",
            "--timeout",
            "7",
        ])
        .unwrap();

        let mut config = Config::default();
        config.limits.max_states = 4;
        config.merge_with_args(&args);

        assert_eq!(
            config.sources,
            vec![SourceConfig {
                id: "KE".to_string(),
                url: "./ke.json".to_string()
            }]
        );
        assert_eq!(config.general.format, OutputFormat::Csv);
        assert_eq!(config.limits.max_states, 4);
        assert_eq!(config.limits.max_categories, 2);
        assert_eq!(config.fetch.timeout_seconds, 7);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[limits]"));
        assert!(toml_str.contains("[[sources]]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.sources, Config::default().sources);
    }
}
