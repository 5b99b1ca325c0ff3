// FILE: src/cli/config.rs

use crate::error::{Result, TokenError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub custom_types: Option<HashMap<String, String>>,
    pub file_base: Option<String>,
    pub color_format: Option<String>,
    pub measurement_format: Option<String>,
    pub file_format: Option<String>,
    pub relative_base: Option<String>,
    pub rem_base: Option<f64>,
    pub evaluator: Option<String>,
    pub target_unit: Option<String>,
    pub skip_keys: Option<Vec<String>>,
    pub flatten: Option<bool>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| TokenError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;

    let config = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content)
            .map_err(|e| TokenError::invalid_format(format!("Invalid JSON config: {}", e)))?
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content)
            .map_err(|e| TokenError::invalid_format(format!("Invalid TOML config: {}", e)))?
    } else {
        return Err(TokenError::invalid_format("Config file must be .json or .toml format"));
    };

    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}
