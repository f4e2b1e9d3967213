// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Access to the NEAR host chain.
//!
//! The provider never talks to the network directly. It goes through the
//! [`HostChainClient`] trait, which exposes the primitives the translation
//! layer needs: view calls, signed function calls, account deployment,
//! block and chunk lookups, transaction status and node status. The types
//! in this module are the NEAR-native shapes those primitives return; the
//! Ethereum shapes live in [`crate::model`].
//!
//! [`rpc_client::NearRpcClient`] implements the trait over NEAR's JSON-RPC
//! HTTP API. Tests substitute their own implementation.

pub mod error;
pub mod rpc_client;
pub mod signer;

use std::fmt::Debug;

use async_trait::async_trait;

pub use error::HostError;
pub use rpc_client::NearRpcClient;
pub use signer::{TransactionSigner, UnsignedTransaction};

/// A NEAR hash (block, chunk or transaction).
pub type CryptoHash = [u8; 32];

/// How a block is addressed on the host chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReference {
    Hash(CryptoHash),
    Height(u64),
    /// The most recent final block.
    Latest,
}

/// A function call to submit as a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub receiver_id: String,
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: u128,
}

/// Result of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub transaction_hash: CryptoHash,
    pub signer_id: String,
    /// Raw value returned by the call, if it returned one.
    pub value: Option<Vec<u8>>,
}

/// Chunk header as listed in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_hash: CryptoHash,
    pub shard_id: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
}

/// A NEAR block. Chunk headers are ordered by shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBlock {
    pub hash: CryptoHash,
    pub prev_hash: CryptoHash,
    pub height: u64,
    /// Nanoseconds since the unix epoch.
    pub timestamp: u64,
    pub author: String,
    pub chunks: Vec<ChunkHeader>,
}

/// A chunk and the transactions it carries, in inclusion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeChunk {
    pub chunk_hash: CryptoHash,
    pub shard_id: u64,
    pub transactions: Vec<NativeTransaction>,
}

/// An action inside a NEAR transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateAccount,
    DeployContract {
        code: Vec<u8>,
    },
    FunctionCall {
        method_name: String,
        args: Vec<u8>,
        gas: u64,
        deposit: u128,
    },
    Transfer {
        deposit: u128,
    },
    AddKey {
        public_key: String,
    },
    /// Actions the provider has no Ethereum mapping for.
    Other(String),
}

/// A NEAR transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTransaction {
    pub hash: CryptoHash,
    pub signer_id: String,
    pub receiver_id: String,
    pub nonce: u64,
    pub actions: Vec<Action>,
}

/// Final status of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success(Option<Vec<u8>>),
    Failure(String),
}

/// A transaction together with where and how it executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    pub transaction: NativeTransaction,
    /// Block that included the transaction.
    pub block_hash: CryptoHash,
    pub status: ExecutionStatus,
    pub gas_burnt: u64,
}

/// Sync section of the node status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncInfo {
    pub latest_block_hash: CryptoHash,
    pub latest_block_height: u64,
    pub earliest_block_height: Option<u64>,
    pub syncing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub chain_id: String,
    pub sync_info: SyncInfo,
}

/// Primitives the provider needs from the host chain.
///
/// Every call is a fresh network round trip; implementations must not
/// cache, and must not retry on their own behalf.
#[async_trait]
pub trait HostChainClient: Send + Sync + Debug + 'static {
    /// Runs a read-only contract method against the latest final state.
    ///
    /// Returns `None` when the method returned nothing.
    async fn view_call(
        &self,
        contract_id: &str,
        method_name: &str,
        args: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, HostError>;

    /// Signs and submits a function call, waiting for its final outcome.
    ///
    /// A failed execution is reported as [`HostError::Execution`].
    async fn call_function(
        &self,
        signer: &dyn TransactionSigner,
        call: FunctionCall,
    ) -> Result<ExecutionOutcome, HostError>;

    /// Creates `account_id`, funds it with `initial_balance` and deploys
    /// `code` to it.
    ///
    /// Fails with [`HostError::AccountAlreadyExists`] when the account is
    /// already there.
    async fn create_and_deploy(
        &self,
        signer: &dyn TransactionSigner,
        account_id: &str,
        code: Vec<u8>,
        initial_balance: u128,
    ) -> Result<ExecutionOutcome, HostError>;

    async fn block(
        &self,
        reference: BlockReference,
    ) -> Result<NativeBlock, HostError>;

    async fn chunk(&self, chunk_hash: CryptoHash)
        -> Result<NativeChunk, HostError>;

    /// Looks up a transaction. NEAR needs the sender to locate it.
    async fn transaction(
        &self,
        hash: CryptoHash,
        sender_id: &str,
    ) -> Result<TransactionStatus, HostError>;

    async fn status(&self) -> Result<NodeStatus, HostError>;
}
