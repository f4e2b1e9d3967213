// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The provider façade.
//!
//! [`NearProvider::request`] is the single entry point: it looks the method
//! up in the [registry](crate::registry), validates the parameters, and
//! hands the call to the [`ContractCallAdapter`] or the
//! [`BlockSynthesizer`]. Errors come back in their original category.
//! [`NearProvider::send`] wraps the outcome in a JSON-RPC 2.0 response
//! envelope.

use std::sync::Arc;

use jsonrpsee::types::ErrorObjectOwned;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::adapter::{
    CallOutput, CallRequest, ContractCallAdapter, TransactionRequest,
};
use crate::codec::{self, expect_str, hex_to_u128, split_tx_ref, Address};
use crate::config::ProviderConfig;
use crate::error::Error;
use crate::host::{BlockReference, HostChainClient, TransactionSigner};
use crate::registry::{EntryPoint, Handler, Method};
use crate::synthesizer::{
    parse_block_hash, parse_block_number, parse_index, BlockSynthesizer,
};
use crate::{Result, NEAR_NET_VERSION, NEAR_NET_VERSION_TEST};

const JSONRPC_VERSION: &str = "2.0";

/// Networks answering `net_version` with the test version.
const TEST_NETWORKS: [&str; 2] = ["local", "test"];

/// An Ethereum JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id: json!(1),
            method: method.into(),
            params,
        }
    }

    pub fn with_id(mut self, id: Value) -> Self {
        self.id = id;
        self
    }
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObjectOwned>,
}

/// Ethereum provider backed by NEAR.
#[derive(Debug, Clone)]
pub struct NearProvider {
    adapter: ContractCallAdapter,
    synthesizer: BlockSynthesizer,
    network_id: String,
}

impl NearProvider {
    /// Creates a provider. Without a `signer` every state-changing method
    /// fails with [`Error::SignerMismatch`].
    pub fn new(
        client: Arc<dyn HostChainClient>,
        evm_contract: impl Into<String>,
        network_id: impl Into<String>,
        signer: Option<Arc<dyn TransactionSigner>>,
    ) -> Self {
        let evm_contract = evm_contract.into();
        Self {
            adapter: ContractCallAdapter::new(
                client.clone(),
                evm_contract.clone(),
                signer,
            ),
            synthesizer: BlockSynthesizer::new(client, evm_contract),
            network_id: network_id.into(),
        }
    }

    pub fn from_config(
        config: &ProviderConfig,
        client: Arc<dyn HostChainClient>,
        signer: Option<Arc<dyn TransactionSigner>>,
    ) -> Self {
        Self::new(
            client,
            config.evm_contract.clone(),
            config.network_id.clone(),
            signer,
        )
    }

    pub fn adapter(&self) -> &ContractCallAdapter {
        &self.adapter
    }

    pub fn synthesizer(&self) -> &BlockSynthesizer {
        &self.synthesizer
    }

    pub fn net_version(&self) -> &'static str {
        if TEST_NETWORKS.contains(&self.network_id.as_str()) {
            NEAR_NET_VERSION_TEST
        } else {
            NEAR_NET_VERSION
        }
    }

    /// Executes a request and returns its result.
    pub async fn request(&self, request: RpcRequest) -> Result<Value> {
        let method: Method = request.method.parse()?;
        let spec = method.spec();
        spec.params.check(method, request.params.len())?;
        debug!(
            %method,
            mode = ?spec.mode,
            handler = ?spec.handler,
            "Dispatching"
        );

        let params = request.params.as_slice();
        match spec.handler {
            Handler::Node => self.node(method).await,
            Handler::Contract(entry_point) => {
                self.contract(entry_point, params).await
            }
            Handler::SendTransaction => {
                let tx: TransactionRequest = from_param(params, 0)?;
                let output = self.adapter.send_transaction(&tx).await?;
                Ok(submitted(output))
            }
            Handler::Block => self.block(method, params).await,
        }
    }

    /// Executes a request and wraps the outcome in a response envelope.
    pub async fn send(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone();
        let (result, error) = match self.request(request).await {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e.into_error_object())),
        };
        RpcResponse {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
            error,
        }
    }

    async fn node(&self, method: Method) -> Result<Value> {
        Ok(match method {
            Method::NetVersion => json!(self.net_version()),
            Method::NetListening => json!(true),
            Method::Web3ClientVersion => {
                json!(concat!("near-web3-provider/", env!("CARGO_PKG_VERSION")))
            }
            Method::GasPrice => json!(codec::quantity(0u64)),
            Method::Accounts => {
                let accounts: Vec<_> =
                    self.adapter.known_accounts().addresses().collect();
                serde_json::to_value(accounts)?
            }
            Method::Syncing => {
                serde_json::to_value(self.synthesizer.sync_status().await?)?
            }
            other => return Err(Error::MethodNotSupported(other.to_string())),
        })
    }

    async fn contract(
        &self,
        entry_point: EntryPoint,
        params: &[Value],
    ) -> Result<Value> {
        match entry_point {
            EntryPoint::GetBalance => {
                let address = address_param(params, 0)?;
                block_param(params, 1)?;
                self.adapter.get_balance(&address).await
            }
            EntryPoint::GetNonce => {
                let address = address_param(params, 0)?;
                block_param(params, 1)?;
                self.adapter.get_nonce(&address).await
            }
            EntryPoint::GetCode => {
                let address = address_param(params, 0)?;
                block_param(params, 1)?;
                self.adapter.get_code(&address).await
            }
            EntryPoint::GetStorageAt => {
                let address = address_param(params, 0)?;
                let key = expect_str(param(params, 1)?, "storage key")?;
                block_param(params, 2)?;
                self.adapter.get_storage_at(&address, key).await
            }
            EntryPoint::ViewCallFunction => {
                let call: CallRequest = from_param(params, 0)?;
                block_param(params, 1)?;
                self.adapter.call(&call).await
            }
            EntryPoint::Deposit => {
                let value = quantity_param(params, 0)?;
                let address = params
                    .get(1)
                    .map(|v| expect_str(v, "address")?.parse::<Address>())
                    .transpose()?;
                Ok(submitted(self.adapter.deposit(value, address).await?))
            }
            EntryPoint::Withdraw => {
                let amount = quantity_param(params, 0)?;
                Ok(submitted(self.adapter.withdraw(amount).await?))
            }
            EntryPoint::DeployCode
            | EntryPoint::CallFunction
            | EntryPoint::Transfer => Err(Error::MethodNotSupported(format!(
                "{entry_point} is only reachable through eth_sendTransaction"
            ))),
        }
    }

    async fn block(&self, method: Method, params: &[Value]) -> Result<Value> {
        let value = match method {
            Method::BlockNumber => {
                json!(codec::quantity(self.synthesizer.block_number().await?))
            }
            Method::GetBlockByHash | Method::GetBlockByNumber => {
                let reference = block_ref_param(method, params)?;
                let full = full_param(params, 1)?;
                let block = self.synthesizer.block(reference, full).await?;
                serde_json::to_value(block)?
            }
            Method::GetBlockTransactionCountByHash
            | Method::GetBlockTransactionCountByNumber => {
                let reference = block_ref_param(method, params)?;
                let count =
                    self.synthesizer.transaction_count(reference).await?;
                json!(codec::quantity(count))
            }
            Method::GetTransactionByHash => {
                let tx_ref = tx_ref_param(params)?;
                serde_json::to_value(
                    self.synthesizer.transaction(&tx_ref).await?,
                )?
            }
            Method::GetTransactionReceipt => {
                let tx_ref = tx_ref_param(params)?;
                serde_json::to_value(self.synthesizer.receipt(&tx_ref).await?)?
            }
            Method::GetTransactionByBlockHashAndIndex
            | Method::GetTransactionByBlockNumberAndIndex => {
                let reference = block_ref_param(method, params)?;
                let index = parse_index(param(params, 1)?)?;
                let tx = self
                    .synthesizer
                    .transaction_by_block_and_index(reference, index)
                    .await?;
                serde_json::to_value(tx)?
            }
            other => return Err(Error::MethodNotSupported(other.to_string())),
        };
        Ok(value)
    }
}

/// Result of a state-changing call: the reference of its transaction.
fn submitted(output: CallOutput) -> Value {
    match output {
        CallOutput::Submitted { tx_ref, .. } => json!(tx_ref.to_string()),
        CallOutput::View(value) => value,
    }
}

fn param(params: &[Value], index: usize) -> Result<&Value> {
    params.get(index).ok_or_else(|| {
        Error::InvalidArgument(format!("missing parameter {index}"))
    })
}

fn from_param<T: DeserializeOwned>(
    params: &[Value],
    index: usize,
) -> Result<T> {
    serde_json::from_value(param(params, index)?.clone()).map_err(|e| {
        Error::InvalidArgument(format!("parameter {index}: {e}"))
    })
}

fn address_param(params: &[Value], index: usize) -> Result<Address> {
    expect_str(param(params, index)?, "address")?.parse()
}

fn quantity_param(params: &[Value], index: usize) -> Result<u128> {
    hex_to_u128(expect_str(param(params, index)?, "quantity")?)
}

/// Validates an optional trailing block parameter. Contract state is
/// always read at the latest final block.
fn block_param(params: &[Value], index: usize) -> Result<()> {
    if let Some(value) = params.get(index) {
        if parse_block_number(value)? != BlockReference::Latest {
            debug!(block = %value, "Reading contract state at latest block");
        }
    }
    Ok(())
}

fn block_ref_param(
    method: Method,
    params: &[Value],
) -> Result<BlockReference> {
    let value = param(params, 0)?;
    match method {
        Method::GetBlockByHash
        | Method::GetBlockTransactionCountByHash
        | Method::GetTransactionByBlockHashAndIndex => parse_block_hash(value),
        _ => parse_block_number(value),
    }
}

fn full_param(params: &[Value], index: usize) -> Result<bool> {
    match params.get(index) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(full)) => Ok(*full),
        Some(other) => Err(Error::InvalidArgument(format!(
            "full transactions flag must be a boolean, got {other}"
        ))),
    }
}

fn tx_ref_param(params: &[Value]) -> Result<codec::TxRef> {
    let raw = expect_str(param(params, 0)?, "transaction")?;
    let tx_ref = split_tx_ref(raw)?;
    tx_ref.hash_bytes()?;
    Ok(tx_ref)
}
