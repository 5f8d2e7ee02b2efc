// ABOUTME: Configuration types and parsing for safeset.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and destination merging.

mod env_value;
mod server;

pub use env_value::EnvValue;
pub use server::ServerConfig;

use crate::error::{Error, Result};
use crate::types::{DocTypeName, FieldName};
use nonempty::NonEmpty;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "safeset.yml";
pub const CONFIG_FILENAME_ALT: &str = "safeset.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".safeset/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub doctype: DocTypeName,

    #[serde(deserialize_with = "deserialize_updates")]
    pub updates: NonEmpty<FieldUpdate>,

    #[serde(default)]
    pub filters: HashMap<String, Value>,

    #[serde(deserialize_with = "deserialize_server")]
    pub server: ServerConfig,

    #[serde(default)]
    pub update_modified: bool,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// One field assignment applied to every matching document.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    pub field: FieldName,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default, deserialize_with = "deserialize_server_option")]
    pub server: Option<ServerConfig>,

    #[serde(default)]
    pub filters: Option<HashMap<String, Value>>,

    #[serde(default, deserialize_with = "deserialize_updates_option")]
    pub updates: Option<NonEmpty<FieldUpdate>>,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl JobConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn for_destination(&self, name: &str) -> Result<JobConfig> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        // Replace server if destination specifies one
        if let Some(ref server) = dest.server {
            merged.server = server.clone();
        }

        // Replace filters if specified
        if let Some(ref filters) = dest.filters {
            merged.filters = filters.clone();
        }

        // Replace updates if specified
        if let Some(ref updates) = dest.updates {
            merged.updates = updates.clone();
        }

        Ok(merged)
    }

    pub fn template() -> Self {
        JobConfig {
            doctype: DocTypeName::new("Customer").unwrap(),
            updates: NonEmpty::new(FieldUpdate {
                field: FieldName::new("customer_group").unwrap(),
                value: Value::String("Commercial".to_string()),
            }),
            filters: HashMap::new(),
            server: ServerConfig::parse("localhost:8000").unwrap(),
            update_modified: false,
            request_timeout: default_request_timeout(),
            destinations: HashMap::new(),
        }
    }
}

pub fn init_config(dir: &Path, doctype: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = JobConfig::template();

    if let Some(d) = doctype {
        config.doctype = DocTypeName::new(d).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &JobConfig) -> String {
    let first_update = config.updates.first();
    format!(
        r#"doctype: {}
updates:
  - field: {}
    value: {}
# filters:
#   disabled: 0
server:
  host: {}
  port: {}
#   api_key: {{ env: SAFESET_API_KEY }}
#   api_secret: {{ env: SAFESET_API_SECRET }}
"#,
        config.doctype,
        first_update.field,
        first_update.value,
        config.server.host,
        config.server.port,
    )
}

// Custom deserializers

fn deserialize_updates<'de, D>(
    deserializer: D,
) -> std::result::Result<NonEmpty<FieldUpdate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<FieldUpdate> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(values)
        .ok_or_else(|| serde::de::Error::custom("at least one update is required"))
}

fn deserialize_updates_option<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NonEmpty<FieldUpdate>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<Vec<FieldUpdate>> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(values) => {
            let nonempty = NonEmpty::from_vec(values).ok_or_else(|| {
                serde::de::Error::custom("destination updates list cannot be empty")
            })?;
            Ok(Some(nonempty))
        }
    }
}

fn deserialize_server<'de, D>(deserializer: D) -> std::result::Result<ServerConfig, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entry = ServerEntry::deserialize(deserializer)?;
    entry.into_server_config().map_err(serde::de::Error::custom)
}

fn deserialize_server_option<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ServerConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<ServerEntry> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(entry) => entry
            .into_server_config()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerEntry {
    Simple(String),
    Detailed(ServerConfig),
}

impl ServerEntry {
    fn into_server_config(self) -> std::result::Result<ServerConfig, String> {
        match self {
            ServerEntry::Simple(s) => ServerConfig::parse(&s),
            ServerEntry::Detailed(c) => Ok(c),
        }
    }
}
