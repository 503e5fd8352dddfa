// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based configuration.

use crate::constants::{CLIENT_VERSION_1, CLIENT_VERSION_CURRENT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings applied by the property sheet encode/decode facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Client version passed to every record codec.
    #[serde(default = "default_client_version")]
    pub client_version: i32,

    /// Validate the sheet before encoding.
    #[serde(default = "default_true")]
    pub validate_on_encode: bool,

    /// Validate the sheet after decoding.
    #[serde(default)]
    pub validate_on_decode: bool,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_client_version() -> i32 {
    CLIENT_VERSION_CURRENT
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            client_version: default_client_version(),
            validate_on_encode: true,
            validate_on_decode: false,
            log_level: default_log_level(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML, e.g. for a generated sample file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(CLIENT_VERSION_1..=CLIENT_VERSION_CURRENT).contains(&self.client_version) {
            return Err(ConfigError::Invalid(format!(
                "client_version {} out of range {}..={}",
                self.client_version, CLIENT_VERSION_1, CLIENT_VERSION_CURRENT
            )));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("Empty log level".into()));
        }
        Ok(())
    }
}

/// Fluent builder for [`CodecConfig`].
#[derive(Debug, Default)]
pub struct CodecConfigBuilder {
    client_version: Option<i32>,
    validate_on_encode: Option<bool>,
    validate_on_decode: Option<bool>,
    log_level: Option<String>,
}

impl CodecConfigBuilder {
    pub fn client_version(mut self, version: i32) -> Self {
        self.client_version = Some(version);
        self
    }

    pub fn validate_on_encode(mut self, enabled: bool) -> Self {
        self.validate_on_encode = Some(enabled);
        self
    }

    pub fn validate_on_decode(mut self, enabled: bool) -> Self {
        self.validate_on_decode = Some(enabled);
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<CodecConfig, ConfigError> {
        let defaults = CodecConfig::default();
        let config = CodecConfig {
            client_version: self.client_version.unwrap_or(defaults.client_version),
            validate_on_encode: self
                .validate_on_encode
                .unwrap_or(defaults.validate_on_encode),
            validate_on_decode: self
                .validate_on_decode
                .unwrap_or(defaults.validate_on_decode),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        };
        config.validate()?;
        Ok(config)
    }
}
