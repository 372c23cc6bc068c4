use config::{Config, ConfigError, Value};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub input_root: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    #[serde(default)]
    pub accumulation: Accumulation,
    #[serde(default = "default_columns", deserialize_with = "string_or_list")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub quote_all: bool,
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,
    #[serde(default = "default_progress")]
    pub progress: bool,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    FanIn,
    Mirrored,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Accumulation {
    #[default]
    Stream,
    Memory,
}

fn default_suffix() -> String {
    ".jsonl".to_string()
}

fn default_output_suffix() -> String {
    ".csv".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

// `columns = "text-first"` and `ETL_COLUMNS=text,likes,...` arrive as one string.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(value) => value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
        StringOrList::Many(names) => names,
    })
}

fn default_columns() -> Vec<String> {
    ["likes", "retweets", "text", "replies", "created_at", "reply_settings"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_flush_interval() -> usize {
    10_000
}

fn default_progress() -> bool {
    true
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path), Vec::new())
    }

    /// Layers an optional config file, `ETL_*` environment variables and
    /// explicit overrides, in increasing priority.
    pub fn load(path: Option<&str>, overrides: Vec<(&str, Value)>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("ETL"));

        for (key, value) in overrides {
            builder = builder.set_override(key, value)?;
        }

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        debug!(
            input_root = %settings.input_root.display(),
            output = %settings.output.display(),
            layout = ?settings.layout,
            "Loaded ingestion settings"
        );

        Ok(settings)
    }
}
