// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use near_web3_provider::config::ProviderConfig;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Ethereum JSON-RPC provider backed by the NEAR EVM contract"
)]
pub struct Args {
    /// Sets the configuration file path
    #[clap(long, short, env = "NEAR_PROVIDER_CONFIG_TOML", value_parser)]
    pub config: Option<PathBuf>,

    /// NEAR JSON-RPC endpoint
    #[clap(long)]
    pub node_url: Option<String>,

    /// Account hosting the EVM contract
    #[clap(long)]
    pub evm_contract: Option<String>,

    /// NEAR network id (e.g. `local`, `testnet`, `mainnet`)
    #[clap(long)]
    pub network_id: Option<String>,

    #[clap(long)]
    /// Address the JSON-RPC server should listen on
    pub listen_address: Option<SocketAddr>,

    /// Output log level
    #[clap(long)]
    pub log_level: Option<tracing::Level>,

    // Change the log format accordingly
    #[clap(long, value_parser = PossibleValuesParser::new(["coloured", "plain", "json"]))]
    pub log_type: Option<String>,

    /// Add log filter(s)
    #[clap(long)]
    pub log_filter: Option<String>,
}

impl Args {
    /// Overrides `config` with the arguments given on the command line.
    pub fn merge_into(&self, config: &mut ProviderConfig) {
        if let Some(url) = &self.node_url {
            config.node_url = url.clone();
        }
        if let Some(contract) = &self.evm_contract {
            config.evm_contract = contract.clone();
        }
        if let Some(network) = &self.network_id {
            config.network_id = network.clone();
        }
        if let Some(addr) = self.listen_address {
            config.listen_address = addr;
        }
        if let Some(level) = self.log_level {
            config.log_level = Some(level.to_string());
        }
        if let Some(log_type) = &self.log_type {
            config.log_type = Some(log_type.clone());
        }
        if let Some(filter) = &self.log_filter {
            config.log_filter = Some(filter.clone());
        }
    }
}
