use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::sync::wait::TimeoutPolicy;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "shop-journey",
    version,
    about = "Persona-aware end-to-end journeys against a demo storefront"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Storefront base URL (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to config file (default: shop-journey.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios from YAML files
    Run {
        /// Scenario YAML file or directory of YAML files
        #[arg(long)]
        scenario: String,

        /// Report format (overrides the config file)
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Scenarios run at once, each in its own browser page
        #[arg(long)]
        parallel: Option<usize>,
    },

    /// List personas and the deviation each one is expected to show
    Personas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";
pub const DEFAULT_CONFIG_FILE: &str = "shop-journey.yaml";

/// Optional YAML config file: `shop-journey.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeouts: TimeoutPolicy,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default = "default_parallel")]
    pub parallel: usize,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeouts: TimeoutPolicy::default(),
            browser: BrowserConfig::default(),
            report: ReportConfig::default(),
            parallel: default_parallel(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// NDJSON browser server script run under Node
    #[serde(default = "default_server_script")]
    pub server_script: PathBuf,

    #[serde(default = "default_node")]
    pub node_binary: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
            node_binary: default_node(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,

    pub output: Option<String>,
}

// Serde default helpers
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_parallel() -> usize {
    1
}

fn default_server_script() -> PathBuf {
    PathBuf::from("browser/server.js")
}

fn default_node() -> String {
    "node".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> JourneyConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = config_path, error = %e, "malformed config, using defaults");
                JourneyConfig::default()
            }
        },
        Err(_) => JourneyConfig::default(),
    }
}

/// Apply CLI overrides on top of the file config.
pub fn apply_overrides(mut config: JourneyConfig, cli: &Cli) -> JourneyConfig {
    if let Some(url) = &cli.base_url {
        config.base_url = normalize_base_url(url);
    }
    config
}

/// The page modules append paths like `inventory.html`, so the base ends with `/`.
pub fn normalize_base_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// `EnvFilter` directive for a `-v` count when `RUST_LOG` is unset.
pub fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
