use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::data_models::FieldId;
use crate::errors::ConfigError;

/// Display metadata for one channel field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub id: FieldId,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Inclusive plausible range; readings outside it are reported.
    #[serde(default)]
    pub valid_range: Option<[f64; 2]>,
}

impl FieldConfig {
    fn new(id: FieldId, name: &str, unit: &str, color: &str, valid_range: [f64; 2]) -> Self {
        Self {
            id,
            name: name.to_string(),
            unit: unit.to_string(),
            color: Some(color.to_string()),
            valid_range: Some(valid_range),
        }
    }
}

/// Which channel fields exist and how to present them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    pub fields: Vec<FieldConfig>,
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldConfig::new(FieldId::Field1, "Interior temperature", "°C", "#ef4444", [-20.0, 50.0]),
                FieldConfig::new(FieldId::Field2, "Air humidity", "%", "#3b82f6", [0.0, 100.0]),
                FieldConfig::new(FieldId::Field3, "Soil humidity", "%", "#10b981", [0.0, 100.0]),
                FieldConfig::new(FieldId::Field4, "Light", "%", "#fbbf24", [0.0, 100.0]),
                FieldConfig::new(FieldId::Field5, "Pressure", "hPa", "#8b5cf6", [800.0, 1100.0]),
                FieldConfig::new(FieldId::Field6, "Exterior temperature", "°C", "#f97316", [-20.0, 50.0]),
            ],
        }
    }
}

impl ChannelLayout {
    pub fn field(&self, id: FieldId) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.id == id)
    }
}

/// Fields feeding the VPD estimate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VpdInputs {
    pub temperature: FieldId,
    pub humidity: FieldId,
}

impl Default for VpdInputs {
    fn default() -> Self {
        Self {
            temperature: FieldId::Field1,
            humidity: FieldId::Field2,
        }
    }
}

/// Where the feed lives and how often to read it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub read_api_key: Option<String>,
    #[serde(default = "default_results")]
    pub results: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            channel_id: String::new(),
            read_api_key: None,
            results: default_results(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.thingspeak.com".to_string()
}

fn default_results() -> usize {
    50
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub layout: ChannelLayout,
    #[serde(default)]
    pub vpd_inputs: VpdInputs,
}

impl DashboardConfig {
    /// Override channel settings from the environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("THINGSPEAK_BASE_URL") {
            self.channel.base_url = url;
        }
        if let Some(channel_id) = lookup("THINGSPEAK_CHANNEL_ID") {
            self.channel.channel_id = channel_id;
        }
        if let Some(key) = lookup("THINGSPEAK_READ_API_KEY") {
            self.channel.read_api_key = Some(key);
        }
        if let Some(results) = lookup("THINGSPEAK_RESULTS") {
            self.channel.results = parse_env("THINGSPEAK_RESULTS", &results)?;
        }
        if let Some(interval) = lookup("POLL_INTERVAL_SECS") {
            self.channel.poll_interval_secs = parse_env("POLL_INTERVAL_SECS", &interval)?;
        }
        Ok(())
    }

    /// Check the settings before any polling starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.channel_id.trim().is_empty() {
            return Err(invalid("channel.channel_id", "must not be empty"));
        }
        if self.channel.results == 0 {
            return Err(invalid("channel.results", "must be at least 1"));
        }
        if self.channel.poll_interval_secs == 0 {
            return Err(invalid("channel.poll_interval_secs", "must be at least 1"));
        }

        let mut seen = HashSet::new();
        for field in &self.layout.fields {
            if !seen.insert(field.id) {
                return Err(invalid("layout.fields", &format!("{} listed twice", field.id)));
            }
            if let Some([low, high]) = field.valid_range {
                if low > high {
                    return Err(invalid(
                        "layout.fields",
                        &format!("{} has an inverted range [{}, {}]", field.id, low, high),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Load the dashboard configuration from a JSON file.
pub fn load_config(path_str: &str) -> Result<DashboardConfig, ConfigError> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }

    let file = File::open(&path).map_err(|e| ConfigError::IoError {
        path: path.clone(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|e| ConfigError::JsonParseError {
        path: path.clone(),
        source: e,
    })
}
