// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Provider configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults,
//! 2. a TOML file ([`ProviderConfig::from_file`]),
//! 3. `NEAR_PROVIDER_*` environment variables ([`ProviderConfig::apply_env`]),
//! 4. command line arguments (merged by the binary).
//!
//! ```toml
//! node_url = "https://rpc.testnet.near.org"
//! evm_contract = "evm"
//! account_id = "alice.testnet"
//! network_id = "testnet"
//! listen_address = "127.0.0.1:8545"
//! request_timeout = "10s"
//! log_level = "debug"
//! log_type = "json"
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::codec::is_valid_account_id;
use crate::DEFAULT_EVM_CONTRACT;

/// Prefix of the environment variables read by [`ProviderConfig::apply_env`].
pub const ENV_PREFIX: &str = "NEAR_PROVIDER_";

pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:3030";
pub const DEFAULT_NETWORK_ID: &str = "local";
pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:8545";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_TYPE: &str = "coloured";

/// Accepted values of `log_type`.
pub const LOG_TYPES: [&str; 3] = ["coloured", "plain", "json"];

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Error parsing TOML
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ConfigError::Validation(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// NEAR JSON-RPC endpoint.
    pub node_url: String,
    /// Account hosting the EVM contract.
    pub evm_contract: String,
    /// Account signing state-changing calls. Read-only when unset.
    pub account_id: Option<String>,
    /// NEAR network id; `local` and `test` report the test `net_version`.
    pub network_id: String,
    /// Address the JSON-RPC server binds to.
    pub listen_address: SocketAddr,
    /// Timeout of a single host chain request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub log_level: Option<String>,
    pub log_type: Option<String>,
    pub log_filter: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            evm_contract: DEFAULT_EVM_CONTRACT.to_string(),
            account_id: None,
            network_id: DEFAULT_NETWORK_ID.to_string(),
            listen_address: SocketAddr::from(([127, 0, 0, 1], 8545)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_level: None,
            log_type: None,
            log_filter: None,
        }
    }
}

impl ProviderConfig {
    /// Loads and validates a TOML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: ProviderConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from `NEAR_PROVIDER_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    /// Overrides fields from a variable lookup keyed by unprefixed name.
    pub fn apply_vars<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get("NODE_URL") {
            self.node_url = url;
        }
        if let Some(contract) = get("EVM_CONTRACT") {
            self.evm_contract = contract;
        }
        if let Some(account) = get("ACCOUNT_ID") {
            self.account_id = Some(account);
        }
        if let Some(network) = get("NETWORK_ID") {
            self.network_id = network;
        }
        if let Some(addr) = get("LISTEN_ADDRESS") {
            self.listen_address = addr.parse().map_err(|e| {
                ConfigError::validation(format!("listen address {addr}: {e}"))
            })?;
        }
        if let Some(timeout) = get("REQUEST_TIMEOUT") {
            self.request_timeout =
                humantime_serde::re::humantime::parse_duration(&timeout)
                    .map_err(|e| {
                        ConfigError::validation(format!(
                            "request timeout {timeout}: {e}"
                        ))
                    })?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = Some(level);
        }
        if let Some(log_type) = get("LOG_TYPE") {
            self.log_type = Some(log_type);
        }
        if let Some(filter) = get("LOG_FILTER") {
            self.log_filter = Some(filter);
        }
        Ok(())
    }

    /// Checks every field that can be checked without network access.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.node_url()?;
        if !is_valid_account_id(&self.evm_contract) {
            return Err(ConfigError::validation(format!(
                "invalid EVM contract account {}",
                self.evm_contract
            )));
        }
        if let Some(account) = &self.account_id {
            if !is_valid_account_id(account) {
                return Err(ConfigError::validation(format!(
                    "invalid signer account {account}"
                )));
            }
        }
        if self.network_id.is_empty() {
            return Err(ConfigError::validation("network id is empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation("request timeout is zero"));
        }
        if let Some(log_type) = &self.log_type {
            if !LOG_TYPES.contains(&log_type.as_str()) {
                return Err(ConfigError::validation(format!(
                    "unknown log type {log_type}"
                )));
            }
        }
        if let Some(level) = &self.log_level {
            level.parse::<tracing::Level>().map_err(|e| {
                ConfigError::validation(format!("log level {level}: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn node_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.node_url).map_err(|e| {
            ConfigError::validation(format!("node url {}: {e}", self.node_url))
        })
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(tracing::Level::INFO)
    }

    pub fn log_type(&self) -> String {
        self.log_type
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_TYPE.into())
    }

    pub fn log_filter(&self) -> String {
        self.log_filter.clone().unwrap_or_default()
    }
}
