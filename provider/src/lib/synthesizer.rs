// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Ethereum blocks and transactions rebuilt from NEAR blocks and chunks.
//!
//! A NEAR block only lists chunk headers; its transactions live in the
//! chunks, which are fetched concurrently and concatenated in shard order.
//! In full-object mode every transaction is then fetched on its own, again
//! concurrently. Both fan-outs are joined with
//! [`futures::future::try_join_all`], which keeps input order whatever the
//! completion order and aborts on the first failure, so a block is either
//! returned complete or not at all.
//!
//! Nothing is cached: every call resolves its block reference against the
//! host chain again.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::codec::{
    self, account_id_to_address, add_prefix, decode_hash, expect_str,
    hex_to_u64, Address, TxRef,
};
use crate::error::Error;
use crate::host::{
    Action, BlockReference, ExecutionStatus, HostChainClient, NativeBlock,
    NativeTransaction, TransactionStatus,
};
use crate::model::block::{Block, BlockTransactions};
use crate::model::empty_bloom;
use crate::model::sync::{SyncProgress, SyncStatus};
use crate::model::transaction::{Receipt, Transaction};
use crate::registry::EntryPoint;
use crate::Result;

/// The only symbolic block tag NEAR can answer.
pub const LATEST_TAG: &str = "latest";

/// Parses a `0x` block hash parameter.
pub fn parse_block_hash(value: &Value) -> Result<BlockReference> {
    let hash = decode_hash(expect_str(value, "block hash")?)?;
    Ok(BlockReference::Hash(hash))
}

/// Parses a block number parameter: a hex quantity, a JSON number, or
/// `"latest"`. Any other tag is rejected.
pub fn parse_block_number(value: &Value) -> Result<BlockReference> {
    match value {
        Value::String(s) if s == LATEST_TAG => Ok(BlockReference::Latest),
        Value::String(s) if s.starts_with("0x") => {
            Ok(BlockReference::Height(hex_to_u64(s)?))
        }
        Value::String(s) => Err(Error::InvalidArgument(format!(
            "unsupported block tag {s}"
        ))),
        Value::Number(n) => n.as_u64().map(BlockReference::Height).ok_or_else(
            || Error::InvalidArgument(format!("invalid block number {n}")),
        ),
        other => Err(Error::InvalidArgument(format!(
            "invalid block number {other}"
        ))),
    }
}

/// Parses a transaction index parameter.
pub fn parse_index(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            Error::InvalidArgument(format!("invalid index {n}"))
        }),
        other => hex_to_u64(expect_str(other, "transaction index")?),
    }
}

/// Reference string of a transaction: `0x<hash>:<signer>`.
pub fn tx_ref_of(tx: &NativeTransaction) -> TxRef {
    TxRef::new(add_prefix(&hex::encode(tx.hash)), tx.signer_id.as_str())
}

/// Ethereum view of the call a NEAR transaction makes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EthereumCall {
    to: Option<Address>,
    value: u128,
    gas: u64,
    input: String,
}

#[derive(Deserialize)]
struct CallArgs {
    contract_address: String,
    encoded_input: String,
}

#[derive(Deserialize)]
struct DeployArgs {
    bytecode: String,
}

#[derive(Deserialize)]
struct TransferArgs {
    address: String,
    amount: String,
}

/// Builds [`Block`]s, [`Transaction`]s and [`Receipt`]s from host chain
/// data.
#[derive(Debug, Clone)]
pub struct BlockSynthesizer {
    client: Arc<dyn HostChainClient>,
    evm_contract: String,
}

impl BlockSynthesizer {
    pub fn new(
        client: Arc<dyn HostChainClient>,
        evm_contract: impl Into<String>,
    ) -> Self {
        Self {
            client,
            evm_contract: evm_contract.into(),
        }
    }

    /// Resolves a block, with transactions as references or, if `full`, as
    /// hydrated objects.
    pub async fn block(
        &self,
        reference: BlockReference,
        full: bool,
    ) -> Result<Block> {
        let native = self.client.block(reference).await?;
        let refs = self.transaction_refs(&native).await?;
        debug!(
            height = native.height,
            chunks = native.chunks.len(),
            transactions = refs.len(),
            full,
            "Synthesizing block"
        );

        let transactions = if full {
            BlockTransactions::Full(self.hydrate(&native, &refs).await?)
        } else {
            BlockTransactions::Refs(refs.iter().map(ToString::to_string).collect())
        };

        let (gas_used, gas_limit) = native
            .chunks
            .iter()
            .fold((0u64, 0u64), |(used, limit), chunk| {
                (
                    used.saturating_add(chunk.gas_used),
                    limit.saturating_add(chunk.gas_limit),
                )
            });

        Ok(Block::new(
            native.height,
            native.hash,
            native.prev_hash,
            account_id_to_address(&native.author),
            codec::convert_timestamp(native.timestamp),
            transactions,
        )
        .with_gas(gas_used, gas_limit))
    }

    pub async fn transaction_count(
        &self,
        reference: BlockReference,
    ) -> Result<u64> {
        let native = self.client.block(reference).await?;
        let refs = self.transaction_refs(&native).await?;
        Ok(refs.len() as u64)
    }

    /// Looks up the transaction at `index`. Out-of-range indexes yield
    /// `None`.
    pub async fn transaction_by_block_and_index(
        &self,
        reference: BlockReference,
        index: u64,
    ) -> Result<Option<Transaction>> {
        let native = self.client.block(reference).await?;
        let refs = self.transaction_refs(&native).await?;
        let Some(tx_ref) = usize::try_from(index).ok().and_then(|i| refs.get(i))
        else {
            return Ok(None);
        };
        let status = self.fetch(tx_ref).await?;
        Ok(Some(self.to_transaction(&status, &native, Some(index))))
    }

    pub async fn transaction(&self, tx_ref: &TxRef) -> Result<Transaction> {
        let (status, native, index) = self.locate(tx_ref).await?;
        Ok(self.to_transaction(&status, &native, index))
    }

    pub async fn receipt(&self, tx_ref: &TxRef) -> Result<Receipt> {
        let (status, native, index) = self.locate(tx_ref).await?;
        let call = self.ethereum_call(&status.transaction);

        let (succeeded, contract_address) = match &status.status {
            ExecutionStatus::Success(value) => {
                let deployed = call
                    .to
                    .is_none()
                    .then(|| value.as_deref().and_then(deployed_address))
                    .flatten();
                (true, deployed)
            }
            ExecutionStatus::Failure(reason) => {
                debug!(%tx_ref, %reason, "Transaction failed");
                (false, None)
            }
        };

        Ok(Receipt {
            transaction_hash: tx_ref_of(&status.transaction).to_string(),
            transaction_index: index,
            block_hash: native.hash,
            block_number: native.height,
            from: account_id_to_address(&status.transaction.signer_id),
            to: call.to,
            gas_used: status.gas_burnt,
            cumulative_gas_used: status.gas_burnt,
            contract_address,
            logs: Vec::new(),
            logs_bloom: empty_bloom(),
            status: u64::from(succeeded),
        })
    }

    /// Height of the latest final block, the block `"latest"` resolves to.
    pub async fn block_number(&self) -> Result<u64> {
        let block = self.client.block(BlockReference::Latest).await?;
        Ok(block.height)
    }

    pub async fn sync_status(&self) -> Result<SyncStatus> {
        let info = self.client.status().await?.sync_info;
        if !info.syncing {
            return Ok(SyncStatus::Synced);
        }
        Ok(SyncStatus::Syncing(SyncProgress {
            starting_block: info.earliest_block_height.unwrap_or_default(),
            current_block: info.latest_block_height,
            highest_block: info.latest_block_height,
        }))
    }

    /// Transaction references of a block, in chunk-then-index order.
    async fn transaction_refs(&self, block: &NativeBlock) -> Result<Vec<TxRef>> {
        let chunks = try_join_all(
            block
                .chunks
                .iter()
                .map(|header| self.client.chunk(header.chunk_hash)),
        )
        .await?;

        Ok(chunks
            .iter()
            .flat_map(|chunk| chunk.transactions.iter().map(tx_ref_of))
            .collect())
    }

    /// Fetches every referenced transaction. Fails as a whole if any fetch
    /// fails.
    async fn hydrate(
        &self,
        block: &NativeBlock,
        refs: &[TxRef],
    ) -> Result<Vec<Transaction>> {
        let statuses = try_join_all(refs.iter().map(|r| self.fetch(r))).await?;
        Ok(statuses
            .iter()
            .zip(0u64..)
            .map(|(status, index)| {
                self.to_transaction(status, block, Some(index))
            })
            .collect())
    }

    async fn fetch(&self, tx_ref: &TxRef) -> Result<TransactionStatus> {
        let hash = tx_ref.hash_bytes()?;
        Ok(self.client.transaction(hash, &tx_ref.account_id).await?)
    }

    /// Fetches a transaction with its block and position in that block.
    async fn locate(
        &self,
        tx_ref: &TxRef,
    ) -> Result<(TransactionStatus, NativeBlock, Option<u64>)> {
        let status = self.fetch(tx_ref).await?;
        let native = self
            .client
            .block(BlockReference::Hash(status.block_hash))
            .await?;
        let refs = self.transaction_refs(&native).await?;
        let hash = status.transaction.hash;
        let index = refs
            .iter()
            .position(|r| r.hash_bytes().is_ok_and(|h| h == hash))
            .map(|i| i as u64);
        Ok((status, native, index))
    }

    fn to_transaction(
        &self,
        status: &TransactionStatus,
        block: &NativeBlock,
        index: Option<u64>,
    ) -> Transaction {
        let tx = &status.transaction;
        let call = self.ethereum_call(tx);
        Transaction {
            hash: tx_ref_of(tx).to_string(),
            nonce: tx.nonce,
            block_hash: block.hash,
            block_number: block.height,
            transaction_index: index,
            from: account_id_to_address(&tx.signer_id),
            to: call.to,
            value: call.value,
            gas: call.gas,
            gas_price: 0,
            input: call.input,
        }
    }

    /// Recovers the Ethereum call a transaction encodes. Calls of the EVM
    /// contract are unwrapped; anything else is shown as a call or transfer
    /// to the receiver's derived address.
    fn ethereum_call(&self, tx: &NativeTransaction) -> EthereumCall {
        let mut call = EthereumCall {
            to: Some(account_id_to_address(&tx.receiver_id)),
            value: 0,
            gas: 0,
            input: "0x".to_string(),
        };
        let to_evm = tx.receiver_id == self.evm_contract;

        for action in &tx.actions {
            match action {
                Action::FunctionCall {
                    method_name,
                    args,
                    gas,
                    deposit,
                } => {
                    call.gas = call.gas.saturating_add(*gas);
                    call.value = call.value.saturating_add(*deposit);
                    call.input = add_prefix(&hex::encode(args));
                    if to_evm {
                        unwrap_evm_call(&mut call, method_name, args);
                    }
                }
                Action::Transfer { deposit } => {
                    call.value = call.value.saturating_add(*deposit);
                }
                Action::DeployContract { code } => {
                    call.input = add_prefix(&hex::encode(code));
                }
                Action::CreateAccount
                | Action::AddKey { .. }
                | Action::Other(_) => {}
            }
        }
        call
    }
}

fn unwrap_evm_call(call: &mut EthereumCall, method_name: &str, args: &[u8]) {
    match method_name {
        m if m == EntryPoint::CallFunction.wire_name() => {
            if let Ok(a) = serde_json::from_slice::<CallArgs>(args) {
                call.to = a.contract_address.parse().ok();
                call.input = add_prefix(&a.encoded_input);
            }
        }
        m if m == EntryPoint::DeployCode.wire_name() => {
            if let Ok(a) = serde_json::from_slice::<DeployArgs>(args) {
                call.to = None;
                call.input = add_prefix(&a.bytecode);
            }
        }
        m if m == EntryPoint::Transfer.wire_name() => {
            if let Ok(a) = serde_json::from_slice::<TransferArgs>(args) {
                call.to = a.address.parse().ok();
                call.value = a.amount.parse().unwrap_or(call.value);
                call.input = "0x".to_string();
            }
        }
        _ => {}
    }
}

/// Address returned by a successful `deploy_code`.
fn deployed_address(value: &[u8]) -> Option<Address> {
    let s: String = serde_json::from_slice(value).ok()?;
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn block_numbers() {
        assert_eq!(
            parse_block_number(&json!("latest")).unwrap(),
            BlockReference::Latest
        );
        assert_eq!(
            parse_block_number(&json!("0x1b4")).unwrap(),
            BlockReference::Height(436)
        );
        assert_eq!(
            parse_block_number(&json!(436)).unwrap(),
            BlockReference::Height(436)
        );
        for tag in ["earliest", "pending", "finalized"] {
            assert_matches!(
                parse_block_number(&json!(tag)),
                Err(Error::InvalidArgument(_))
            );
        }
        assert_matches!(
            parse_block_number(&json!(-1)),
            Err(Error::InvalidArgument(_))
        );
    }

    #[test]
    fn block_hashes() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(
            parse_block_hash(&json!(hash)).unwrap(),
            BlockReference::Hash([0xab; 32])
        );
        assert_matches!(
            parse_block_hash(&json!("0xabcd")),
            Err(Error::InvalidArgument(_))
        );
        assert_matches!(
            parse_block_hash(&json!(12)),
            Err(Error::InvalidArgument(_))
        );
    }

    #[test]
    fn indexes() {
        assert_eq!(parse_index(&json!("0x2")).unwrap(), 2);
        assert_eq!(parse_index(&json!(2)).unwrap(), 2);
        assert_matches!(parse_index(&json!(null)), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn evm_calls_are_unwrapped() {
        let target = account_id_to_address("target.near");
        let args = json!({
            "contract_address": target.to_raw_hex(),
            "encoded_input": "deadbeef",
        });
        let mut call = EthereumCall {
            to: None,
            value: 5,
            gas: 0,
            input: "0x".into(),
        };
        unwrap_evm_call(
            &mut call,
            "call_function",
            &serde_json::to_vec(&args).unwrap(),
        );
        assert_eq!(call.to, Some(target));
        assert_eq!(call.input, "0xdeadbeef");
        assert_eq!(call.value, 5);

        let deploy = serde_json::to_vec(&json!({"bytecode": "6080"})).unwrap();
        unwrap_evm_call(&mut call, "deploy_code", &deploy);
        assert_eq!(call.to, None);
        assert_eq!(call.input, "0x6080");
    }

    #[test]
    fn deployed_addresses_parse() {
        let address = account_id_to_address("x.near");
        let raw = serde_json::to_vec(&address.to_raw_hex()).unwrap();
        assert_eq!(deployed_address(&raw), Some(address));
        assert_eq!(deployed_address(b"null"), None);
    }
}
