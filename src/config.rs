//! Configuration and credentials file schemas (§1.3, §6 "Shared resources").
//!
//! Thin surfaces around the core per spec.md §1 — plain serde structs loaded
//! from disk with no validation beyond "does it parse".

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub region: String,
    pub kiro_version: String,
    #[serde(default)]
    pub machine_id: Option<String>,
    pub system_version: String,
    pub node_version: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| GatewayError::Config(format!("parsing {}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub access_token: Option<String>,
    pub refresh_token: String,
    #[serde(default)]
    pub profile_arn: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub auth_method: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| GatewayError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), GatewayError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .map_err(|e| GatewayError::Config(format!("writing {}: {e}", path.display())))
    }
}
