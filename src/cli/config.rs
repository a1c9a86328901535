use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::autofill::AutofillOptions;
use crate::browser::session::DEFAULT_SERVER_SCRIPT;
use crate::enrich::page_text::DEFAULT_PAGE_TEXT_BUDGET;
use crate::form::label::DEFAULT_MAX_LABEL_DEPTH;
use crate::form::scanner::ScanOptions;

pub const DEFAULT_CONFIG_PATH: &str = "form-autofill.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Discover web forms and fill them from a user profile"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the forms and fillable fields of an HTML page
    Scan {
        /// HTML file to scan
        #[arg(long)]
        html: String,

        /// URL the page was served from (resolves relative form actions)
        #[arg(long)]
        url: Option<String>,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Write known values into one form of an HTML page
    Fill {
        /// HTML file containing the form
        #[arg(long)]
        html: String,

        /// Form id as reported by `scan`
        #[arg(long)]
        form_id: String,

        /// Form fingerprint as reported by `scan`
        #[arg(long)]
        fingerprint: Option<String>,

        /// JSON or YAML file with the values (`formFields` list or bare list)
        #[arg(long)]
        values: String,

        /// Where to write the filled HTML (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Scan, enrich from a profile and fill one form
    Autofill {
        /// HTML file to fill offline
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        html: Option<String>,

        /// Live page to open in the browser bridge
        #[arg(long)]
        url: Option<String>,

        /// JSON or YAML user profile
        #[arg(long)]
        profile: String,

        /// Form to fill (default: the first form on the page)
        #[arg(long)]
        form_id: Option<String>,

        /// Value source: profile or llm
        #[arg(long)]
        analyzer: Option<String>,

        /// Where to write the filled HTML (offline mode only, default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Scroll a form of a live page into view
    Highlight {
        /// Page to open in the browser bridge
        #[arg(long)]
        url: String,

        /// Form id as reported by `scan`
        #[arg(long)]
        form_id: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_label_depth")]
    pub max_label_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_label_depth: DEFAULT_MAX_LABEL_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    #[serde(default = "default_page_text_budget")]
    pub page_text_budget: usize,

    #[serde(default = "default_analyzer")]
    pub analyzer: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            page_text_budget: DEFAULT_PAGE_TEXT_BUDGET,
            analyzer: default_analyzer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
        }
    }
}

/// JSONL audit trail; disabled when no path is set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_label_depth() -> usize { DEFAULT_MAX_LABEL_DEPTH }
fn default_page_text_budget() -> usize { DEFAULT_PAGE_TEXT_BUDGET }
fn default_analyzer() -> String { "profile".to_string() }
fn default_server_script() -> String { DEFAULT_SERVER_SCRIPT.to_string() }

impl AppConfig {
    pub fn autofill_options(&self) -> AutofillOptions {
        AutofillOptions {
            scan: ScanOptions {
                max_label_depth: self.scan.max_label_depth,
            },
            page_text_budget: self.enrich.page_text_budget,
        }
    }
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Settings resolution (CLI flag > config file > default)
// ============================================================================

/// Ollama endpoint/model and analyzer choice after merging CLI and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichSettings {
    pub analyzer: String,
    pub ollama_endpoint: Option<String>,
    pub ollama_model: Option<String>,
}

pub fn resolve_enrich_settings(
    cli: &Cli,
    config: &AppConfig,
    analyzer: Option<&str>,
) -> EnrichSettings {
    EnrichSettings {
        analyzer: analyzer.unwrap_or(&config.enrich.analyzer).to_string(),
        ollama_endpoint: cli
            .ollama_endpoint
            .clone()
            .or_else(|| config.ollama.endpoint.clone()),
        ollama_model: cli
            .ollama_model
            .clone()
            .or_else(|| config.ollama.model.clone()),
    }
}
