// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! [`HostChainClient`] over NEAR's JSON-RPC HTTP API.
//!
//! Hashes travel base58 encoded and call arguments base64 encoded, as the
//! NEAR node expects. Structured node errors are recognized by their
//! `cause.name`, and a failed account creation is recognized by the
//! `AccountAlreadyExists` action error kind rather than by message text.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace};
use url::Url;

use super::{
    Action, BlockReference, ChunkHeader, CryptoHash, ExecutionOutcome,
    ExecutionStatus, FunctionCall, HostChainClient, HostError, NativeBlock,
    NativeChunk, NativeTransaction, NodeStatus, SyncInfo, TransactionSigner,
    TransactionStatus, UnsignedTransaction,
};

const JSONRPC_ID: &str = "near-web3-provider";

#[derive(Debug, Clone)]
/// NEAR JSON-RPC client
pub struct NearRpcClient {
    url: Url,
    http: reqwest::Client,
}

impl NearRpcClient {
    /// Create a client for the node at `url`. Every request is bounded by
    /// `timeout`.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, HostError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HostError::Transport(e.to_string()))?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<R, HostError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": JSONRPC_ID,
            "method": method,
            "params": params,
        });
        trace!(method, %params, "Calling host chain");

        let response =
            self.http.post(self.url.clone()).json(&body).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let error = response
                .text()
                .await
                .unwrap_or_else(|_| "unparsable error".into());
            return Err(HostError::Transport(format!("{status}: {error}")));
        }

        let envelope: wire::Envelope = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(error.into_host_error());
        }
        let result = envelope.result.ok_or_else(|| {
            HostError::InvalidResponse(format!("{method}: missing result"))
        })?;
        serde_json::from_value(result)
            .map_err(|e| HostError::InvalidResponse(format!("{method}: {e}")))
    }

    async fn submit(
        &self,
        signer: &dyn TransactionSigner,
        receiver_id: &str,
        actions: Vec<Action>,
    ) -> Result<ExecutionOutcome, HostError> {
        let key: wire::AccessKeyView = self
            .call(
                "query",
                json!({
                    "request_type": "view_access_key",
                    "finality": "final",
                    "account_id": signer.account_id(),
                    "public_key": signer.public_key(),
                }),
            )
            .await?;

        let tx = UnsignedTransaction {
            signer_id: signer.account_id().to_string(),
            public_key: signer.public_key().to_string(),
            nonce: key.nonce + 1,
            receiver_id: receiver_id.to_string(),
            block_hash: decode_hash(&key.block_hash)?,
            actions,
        };
        let signed = signer.sign(&tx)?;
        debug!(
            signer = %tx.signer_id,
            receiver = %tx.receiver_id,
            nonce = tx.nonce,
            "Broadcasting transaction"
        );

        let outcome: wire::FinalOutcomeView = self
            .call("broadcast_tx_commit", json!([BASE64.encode(signed)]))
            .await?;

        let status = parse_status(&outcome.status)?;
        let transaction_hash = decode_hash(&outcome.transaction.hash)?;
        match status {
            ExecutionStatus::Success(value) => Ok(ExecutionOutcome {
                transaction_hash,
                signer_id: outcome.transaction.signer_id,
                value,
            }),
            ExecutionStatus::Failure(reason) => {
                Err(HostError::Execution(reason))
            }
        }
    }
}

#[async_trait]
impl HostChainClient for NearRpcClient {
    async fn view_call(
        &self,
        contract_id: &str,
        method_name: &str,
        args: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, HostError> {
        let result: wire::CallResult = self
            .call(
                "query",
                json!({
                    "request_type": "call_function",
                    "finality": "final",
                    "account_id": contract_id,
                    "method_name": method_name,
                    "args_base64": BASE64.encode(args),
                }),
            )
            .await?;

        if let Some(error) = result.error {
            return Err(HostError::Execution(error));
        }
        Ok(Some(result.result).filter(|bytes| !bytes.is_empty()))
    }

    async fn call_function(
        &self,
        signer: &dyn TransactionSigner,
        call: FunctionCall,
    ) -> Result<ExecutionOutcome, HostError> {
        let action = Action::FunctionCall {
            method_name: call.method_name,
            args: call.args,
            gas: call.gas,
            deposit: call.deposit,
        };
        self.submit(signer, &call.receiver_id, vec![action]).await
    }

    async fn create_and_deploy(
        &self,
        signer: &dyn TransactionSigner,
        account_id: &str,
        code: Vec<u8>,
        initial_balance: u128,
    ) -> Result<ExecutionOutcome, HostError> {
        let actions = vec![
            Action::CreateAccount,
            Action::Transfer {
                deposit: initial_balance,
            },
            Action::AddKey {
                public_key: signer.public_key().to_string(),
            },
            Action::DeployContract { code },
        ];
        self.submit(signer, account_id, actions).await
    }

    async fn block(
        &self,
        reference: BlockReference,
    ) -> Result<NativeBlock, HostError> {
        let params = match reference {
            BlockReference::Hash(hash) => {
                json!({ "block_id": bs58::encode(hash).into_string() })
            }
            BlockReference::Height(height) => json!({ "block_id": height }),
            BlockReference::Latest => json!({ "finality": "final" }),
        };
        let view: wire::BlockView = self.call("block", params).await?;
        view.try_into()
    }

    async fn chunk(
        &self,
        chunk_hash: CryptoHash,
    ) -> Result<NativeChunk, HostError> {
        let params =
            json!({ "chunk_id": bs58::encode(chunk_hash).into_string() });
        let view: wire::ChunkView = self.call("chunk", params).await?;
        view.try_into()
    }

    async fn transaction(
        &self,
        hash: CryptoHash,
        sender_id: &str,
    ) -> Result<TransactionStatus, HostError> {
        let params = json!([bs58::encode(hash).into_string(), sender_id]);
        let view: wire::FinalOutcomeView = self.call("tx", params).await?;
        let status = match parse_status(&view.status) {
            Ok(status) => status,
            Err(HostError::AccountAlreadyExists(reason)) => {
                ExecutionStatus::Failure(reason)
            }
            Err(e) => return Err(e),
        };
        Ok(TransactionStatus {
            transaction: view.transaction.try_into()?,
            block_hash: decode_hash(&view.transaction_outcome.block_hash)?,
            status,
            gas_burnt: view.transaction_outcome.outcome.gas_burnt,
        })
    }

    async fn status(&self) -> Result<NodeStatus, HostError> {
        let view: wire::StatusView = self.call("status", json!([])).await?;
        Ok(NodeStatus {
            chain_id: view.chain_id,
            sync_info: SyncInfo {
                latest_block_hash: decode_hash(
                    &view.sync_info.latest_block_hash,
                )?,
                latest_block_height: view.sync_info.latest_block_height,
                earliest_block_height: view.sync_info.earliest_block_height,
                syncing: view.sync_info.syncing,
            },
        })
    }
}

fn decode_hash(value: &str) -> Result<CryptoHash, HostError> {
    let bytes = bs58::decode(value)
        .into_vec()
        .map_err(|e| HostError::InvalidResponse(format!("{value}: {e}")))?;
    bytes.try_into().map_err(|_| {
        HostError::InvalidResponse(format!("{value} is not a 32-byte hash"))
    })
}

fn decode_base64(value: &str) -> Result<Vec<u8>, HostError> {
    BASE64
        .decode(value)
        .map_err(|e| HostError::InvalidResponse(format!("{value}: {e}")))
}

fn parse_balance(value: &Value) -> Result<u128, HostError> {
    match value {
        Value::String(s) => s.parse().map_err(|_| {
            HostError::InvalidResponse(format!("invalid balance {s}"))
        }),
        Value::Number(n) => n.as_u64().map(u128::from).ok_or_else(|| {
            HostError::InvalidResponse(format!("invalid balance {n}"))
        }),
        Value::Null => Ok(0),
        other => {
            Err(HostError::InvalidResponse(format!("invalid balance {other}")))
        }
    }
}

/// Parses a NEAR action view.
///
/// Unit actions arrive as bare strings, the rest as single-key objects.
fn parse_action(value: &Value) -> Result<Action, HostError> {
    if let Some(name) = value.as_str() {
        return Ok(match name {
            "CreateAccount" => Action::CreateAccount,
            other => Action::Other(other.to_string()),
        });
    }

    let (kind, body) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| {
            HostError::InvalidResponse(format!("invalid action {value}"))
        })?;
    let field = |name: &str| body.get(name).unwrap_or(&Value::Null);
    let text = |name: &str| field(name).as_str().unwrap_or_default();

    let action = match kind.as_str() {
        "CreateAccount" => Action::CreateAccount,
        "DeployContract" => Action::DeployContract {
            code: decode_base64(text("code"))?,
        },
        "FunctionCall" => Action::FunctionCall {
            method_name: text("method_name").to_string(),
            args: decode_base64(text("args"))?,
            gas: field("gas").as_u64().unwrap_or_default(),
            deposit: parse_balance(field("deposit"))?,
        },
        "Transfer" => Action::Transfer {
            deposit: parse_balance(field("deposit"))?,
        },
        "AddKey" => Action::AddKey {
            public_key: text("public_key").to_string(),
        },
        other => Action::Other(other.to_string()),
    };
    Ok(action)
}

/// Parses the `status` of a final execution outcome.
fn parse_status(value: &Value) -> Result<ExecutionStatus, HostError> {
    if let Some(success) = value.get("SuccessValue") {
        let raw = success.as_str().unwrap_or_default();
        let bytes = decode_base64(raw)?;
        return Ok(ExecutionStatus::Success(
            Some(bytes).filter(|b| !b.is_empty()),
        ));
    }
    if value.get("SuccessReceiptId").is_some() {
        return Ok(ExecutionStatus::Success(None));
    }
    if let Some(failure) = value.get("Failure") {
        if let Some(exists) =
            failure.pointer("/ActionError/kind/AccountAlreadyExists")
        {
            let account = exists
                .get("account_id")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Err(HostError::AccountAlreadyExists(account.to_string()));
        }
        return Ok(ExecutionStatus::Failure(failure.to_string()));
    }
    Ok(ExecutionStatus::Failure(format!("not final: {value}")))
}

mod wire {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct Envelope {
        pub result: Option<Value>,
        pub error: Option<ErrorView>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorCause {
        pub name: String,
        #[serde(default)]
        pub info: Value,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorView {
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub cause: Option<ErrorCause>,
        #[serde(default)]
        pub message: Option<String>,
        #[serde(default)]
        pub data: Value,
    }

    impl ErrorView {
        pub fn into_host_error(self) -> HostError {
            let detail = match (&self.message, &self.data) {
                (_, Value::String(data)) => data.clone(),
                (Some(message), Value::Null) => message.clone(),
                (message, data) => {
                    format!("{}: {data}", message.as_deref().unwrap_or(""))
                }
            };
            let cause = self.cause.map(|c| (c.name, c.info));
            match cause {
                Some((name, info)) => {
                    let info = info.to_string();
                    match name.as_str() {
                        "UNKNOWN_BLOCK" => HostError::UnknownBlock(info),
                        "UNKNOWN_CHUNK" => HostError::UnknownChunk(info),
                        "UNKNOWN_TRANSACTION" => {
                            HostError::UnknownTransaction(info)
                        }
                        "INVALID_TRANSACTION"
                        | "CONTRACT_EXECUTION_ERROR" => {
                            HostError::Execution(format!("{name}: {info}"))
                        }
                        "TIMEOUT_ERROR" => HostError::Transport(detail),
                        _ => HostError::Transport(format!("{name}: {detail}")),
                    }
                }
                None => match self.name {
                    Some(name) => {
                        HostError::Transport(format!("{name}: {detail}"))
                    }
                    None => HostError::Transport(detail),
                },
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct CallResult {
        #[serde(default)]
        pub result: Vec<u8>,
        #[serde(default)]
        pub error: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AccessKeyView {
        pub nonce: u64,
        pub block_hash: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct BlockHeaderView {
        pub height: u64,
        pub hash: String,
        pub prev_hash: String,
        pub timestamp: u64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChunkHeaderView {
        pub chunk_hash: String,
        pub shard_id: u64,
        #[serde(default)]
        pub gas_used: u64,
        #[serde(default)]
        pub gas_limit: u64,
        /// Height of the block that produced the chunk. Shards without a
        /// new chunk repeat their previous header with an older height.
        #[serde(default)]
        pub height_included: Option<u64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct BlockView {
        pub author: String,
        pub header: BlockHeaderView,
        pub chunks: Vec<ChunkHeaderView>,
    }

    impl TryFrom<BlockView> for NativeBlock {
        type Error = HostError;

        fn try_from(view: BlockView) -> Result<Self, Self::Error> {
            let height = view.header.height;
            let mut chunks = view
                .chunks
                .into_iter()
                .filter(|c| c.height_included.is_none_or(|h| h == height))
                .map(|c| {
                    Ok(ChunkHeader {
                        chunk_hash: decode_hash(&c.chunk_hash)?,
                        shard_id: c.shard_id,
                        gas_used: c.gas_used,
                        gas_limit: c.gas_limit,
                    })
                })
                .collect::<Result<Vec<_>, HostError>>()?;
            chunks.sort_by_key(|c| c.shard_id);

            Ok(NativeBlock {
                hash: decode_hash(&view.header.hash)?,
                prev_hash: decode_hash(&view.header.prev_hash)?,
                height: view.header.height,
                timestamp: view.header.timestamp,
                author: view.author,
                chunks,
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct TransactionView {
        pub hash: String,
        pub signer_id: String,
        pub receiver_id: String,
        pub nonce: u64,
        #[serde(default)]
        pub actions: Vec<Value>,
    }

    impl TryFrom<TransactionView> for NativeTransaction {
        type Error = HostError;

        fn try_from(view: TransactionView) -> Result<Self, Self::Error> {
            Ok(NativeTransaction {
                hash: decode_hash(&view.hash)?,
                signer_id: view.signer_id,
                receiver_id: view.receiver_id,
                nonce: view.nonce,
                actions: view
                    .actions
                    .iter()
                    .map(parse_action)
                    .collect::<Result<_, _>>()?,
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ChunkView {
        pub header: ChunkHeaderView,
        pub transactions: Vec<TransactionView>,
    }

    impl TryFrom<ChunkView> for NativeChunk {
        type Error = HostError;

        fn try_from(view: ChunkView) -> Result<Self, Self::Error> {
            Ok(NativeChunk {
                chunk_hash: decode_hash(&view.header.chunk_hash)?,
                shard_id: view.header.shard_id,
                transactions: view
                    .transactions
                    .into_iter()
                    .map(NativeTransaction::try_from)
                    .collect::<Result<_, _>>()?,
            })
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct OutcomeView {
        #[serde(default)]
        pub gas_burnt: u64,
    }

    #[derive(Debug, Deserialize)]
    pub struct OutcomeWithIdView {
        pub block_hash: String,
        pub outcome: OutcomeView,
    }

    #[derive(Debug, Deserialize)]
    pub struct FinalOutcomeView {
        pub status: Value,
        pub transaction: TransactionView,
        pub transaction_outcome: OutcomeWithIdView,
    }

    #[derive(Debug, Deserialize)]
    pub struct SyncInfoView {
        pub latest_block_hash: String,
        pub latest_block_height: u64,
        #[serde(default)]
        pub earliest_block_height: Option<u64>,
        pub syncing: bool,
    }

    #[derive(Debug, Deserialize)]
    pub struct StatusView {
        pub chain_id: String,
        pub sync_info: SyncInfoView,
    }
}
