//! Document metadata supplied by the caller.
//!
//! [`Config`] carries the API info and global servers, [`Options`] the optional extras
//! (terms of service, contact, license) and the path-scoped server overrides. The CLI reads
//! both from one [`Settings`] file.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Free-form JSON object, used for `contact` and `license`
pub type Container = serde_json::Map<String, serde_json::Value>;

/// OpenAPI Server object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server used instead of the global ones for every path starting with `root`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOverride {
    pub root: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub servers: Option<Vec<Server>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub servers: Option<Vec<ServerOverride>>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Container>,
    pub license: Option<Container>,
}

/// Contents of a settings file: `{ "config": {...}, "options": {...} }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub options: Options,
}

impl Settings {
    /// Loads settings from a JSON file, or a YAML file when the extension is `yaml`/`yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not match the settings shape.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let settings = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML settings in {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON settings in {}", path.display()))?
        };

        Ok(settings)
    }
}
