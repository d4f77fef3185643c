//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// AdStats - classified-ad listing counts by country
///
/// Fetches listing metadata for each configured country and prints the
/// overall total plus counts by state and by category, as JSON or CSV.
///
/// Examples:
///   adstats
///   adstats --country NG --format csv --max-states 3 --max-categories 3
///   adstats --source NG=https://api.example.com/items?location=ng --format json
///   adstats --source KE=./fixtures/ke.json --country KE
///   adstats --skip UG --format csv
///   adstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Data source as ID=LOCATION (repeatable)
    ///
    /// LOCATION is an http(s) URL or a local file path. When given, these
    /// replace the sources from the configuration file.
    #[arg(short, long = "source", value_name = "ID=LOCATION", value_parser = parse_source)]
    pub sources: Vec<(String, String)>,

    /// Source ID to leave out of the refresh (repeatable)
    #[arg(long = "skip", value_name = "ID")]
    pub skip: Vec<String>,

    /// Country to render (all countries when omitted)
    #[arg(long, value_name = "ID")]
    pub country: Option<String>,

    /// Output format (json, csv)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Maximum number of states per country (0 = unlimited)
    #[arg(long, value_name = "COUNT")]
    pub max_states: Option<usize>,

    /// Maximum number of categories per country (0 = unlimited)
    #[arg(long, value_name = "COUNT")]
    pub max_categories: Option<usize>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .adstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", env = "ADSTATS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .adstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for rendered counts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON document (default)
    #[default]
    Json,
    /// Label line plus value line per country
    Csv,
}

/// Parse a `ID=LOCATION` pair.
fn parse_source(s: &str) -> Result<(String, String), String> {
    let (id, location) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=LOCATION, got '{}'", s))?;

    let id = id.trim();
    let location = location.trim();
    if id.is_empty() {
        return Err("source ID must not be empty".to_string());
    }
    if location.is_empty() {
        return Err(format!("location for source '{}' must not be empty", id));
    }

    Ok((id.to_string(), location.to_string()))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref country) = self.country {
            if country.trim().is_empty() {
                return Err("--country must not be empty; omit it to render all".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
