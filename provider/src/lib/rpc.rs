// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! JSON-RPC server exposing a [`NearProvider`].
//!
//! The module is built from [`Method::ALL`]: every registry entry becomes a
//! `jsonrpsee` method forwarding to [`NearProvider::request`]. Methods that
//! are not in the registry are rejected by `jsonrpsee` itself with
//! `-32601`.

use std::net::SocketAddr;

use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::RpcModule;
use serde_json::Value;
use tracing::info;

use crate::error::Error;
use crate::provider::{NearProvider, RpcRequest};
use crate::registry::Method;

/// Reads positional parameters. Absent params are an empty list.
fn positional(params: &Params<'_>) -> Result<Vec<Value>, Error> {
    params
        .parse::<Option<Vec<Value>>>()
        .map(Option::unwrap_or_default)
        .map_err(|e| Error::InvalidArgument(e.message().to_string()))
}

/// Builds the RPC module answering every registry method.
pub fn into_rpc_module(
    provider: NearProvider,
) -> anyhow::Result<RpcModule<NearProvider>> {
    let mut module = RpcModule::new(provider);

    for &method in Method::ALL {
        module.register_async_method(
            method.as_str(),
            move |params, provider, _| async move {
                let params =
                    positional(&params).map_err(ErrorObjectOwned::from)?;
                let request = RpcRequest::new(method.as_str(), params);
                provider
                    .request(request)
                    .await
                    .map_err(ErrorObjectOwned::from)
            },
        )?;
    }

    Ok(module)
}

/// Starts an HTTP and WebSocket JSON-RPC server on `addr`.
pub async fn run_server(
    provider: NearProvider,
    addr: SocketAddr,
) -> anyhow::Result<(SocketAddr, ServerHandle)> {
    let module = into_rpc_module(provider)?;
    let server = Server::builder().build(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind JSON-RPC server to {addr}: {e}")
    })?;
    let local_addr = server.local_addr()?;
    let handle = server.start(module);
    info!(%local_addr, methods = Method::ALL.len(), "JSON-RPC server started");
    Ok((local_addr, handle))
}
