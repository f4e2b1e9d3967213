// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod args;
mod log;

use std::sync::Arc;

use clap::Parser;
use near_web3_provider::config::ProviderConfig;
use near_web3_provider::host::NearRpcClient;
use near_web3_provider::{rpc, NearProvider};
use tracing::{error, info, warn};

use crate::args::Args;
use crate::log::Log;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ProviderConfig::from_file(path)?,
        None => ProviderConfig::default(),
    };
    config.apply_env()?;
    args.merge_into(&mut config);
    config.validate()?;

    Log::new(config.log_level(), config.log_filter(), config.log_type())
        .register()?;

    let client =
        NearRpcClient::new(config.node_url()?, config.request_timeout)?;
    let client = Arc::new(client);

    // Key material is not loaded by the provider.
    if let Some(account) = &config.account_id {
        warn!(%account, "No key available for signer, running read-only");
    } else {
        warn!("No signer configured, running read-only");
    }
    let provider = NearProvider::from_config(&config, client, None);

    info!(
        node_url = %config.node_url,
        evm_contract = %config.evm_contract,
        network_id = %config.network_id,
        net_version = provider.net_version(),
        "Starting provider"
    );

    let (addr, handle) =
        match rpc::run_server(provider, config.listen_address).await {
            Ok(started) => started,
            Err(e) => {
                error!(listen_address = %config.listen_address, "{e}");
                return Err(e);
            }
        };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!(%addr, "Shutting down JSON-RPC server");
            handle.stop()?;
            handle.stopped().await;
        }
        _ = handle.clone().stopped() => {
            warn!(%addr, "JSON-RPC server stopped");
        }
    }

    Ok(())
}
