// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use near_web3_provider::host::{
    BlockReference, CryptoHash, ExecutionOutcome, FunctionCall,
    HostChainClient, HostError, NativeBlock, NativeChunk, NodeStatus,
    SyncInfo, TransactionSigner, TransactionStatus,
};

/// Hash of every transaction submitted through the mock.
pub const SUBMITTED_TX_HASH: CryptoHash = [0xab; 32];

/// Mock implementation of `HostChainClient` for testing.
#[derive(Default)]
pub struct MockHostClient {
    /// Force an error on all method calls if Some.
    pub force_error: Option<HostError>,
    /// Raw results by contract method name, for views and calls alike.
    pub results: HashMap<String, Vec<u8>>,
    /// Blocks ordered by height.
    pub blocks: Vec<NativeBlock>,
    /// Index into `blocks` of the block `Latest` resolves to.
    pub latest: AtomicUsize,
    pub chunks: HashMap<CryptoHash, NativeChunk>,
    pub transactions: HashMap<CryptoHash, TransactionStatus>,
    /// Transactions whose lookup fails with a transport error.
    pub failing_transactions: HashSet<CryptoHash>,
    /// Artificial latency of chunk and transaction fetches.
    pub delays: HashMap<CryptoHash, Duration>,
    /// Whether `create_and_deploy` hits an existing account.
    pub account_exists: bool,
    pub syncing: bool,
    /// Head height reported by `status`.
    pub latest_height: AtomicU64,
    pub view_calls: AtomicUsize,
    pub submissions: AtomicUsize,
    /// Function calls received, in submission order.
    pub submitted: Mutex<Vec<FunctionCall>>,
}

// Manual implementation of Debug
impl std::fmt::Debug for MockHostClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHostClient")
            .field("force_error", &self.force_error)
            .field("results", &self.results.keys())
            .field("blocks", &self.blocks.len())
            .field("latest", &self.latest)
            .field("chunks", &self.chunks.len())
            .field("transactions", &self.transactions.len())
            .field("failing_transactions", &self.failing_transactions)
            .field("account_exists", &self.account_exists)
            .field("syncing", &self.syncing)
            .field("latest_height", &self.latest_height)
            .field("view_calls", &self.view_calls)
            .field("submissions", &self.submissions)
            .finish()
    }
}

impl MockHostClient {
    pub fn with_error(error: HostError) -> Self {
        Self {
            force_error: Some(error),
            ..Default::default()
        }
    }

    pub fn with_result(mut self, method_name: &str, raw: &[u8]) -> Self {
        self.results.insert(method_name.to_string(), raw.to_vec());
        self
    }

    /// Appends a block and makes it the latest.
    pub fn insert_block(&mut self, block: NativeBlock) {
        self.latest_height.store(block.height, Ordering::SeqCst);
        self.latest.store(self.blocks.len(), Ordering::SeqCst);
        self.blocks.push(block);
    }

    /// Moves the latest block to the one at `height`.
    pub fn set_latest(&self, height: u64) {
        if let Some(index) = self.blocks.iter().position(|b| b.height == height)
        {
            self.latest.store(index, Ordering::SeqCst);
            self.latest_height.store(height, Ordering::SeqCst);
        }
    }

    pub fn insert_chunk(&mut self, chunk: NativeChunk) {
        self.chunks.insert(chunk.chunk_hash, chunk);
    }

    pub fn insert_transaction(&mut self, status: TransactionStatus) {
        self.transactions.insert(status.transaction.hash, status);
    }

    pub fn view_count(&self) -> usize {
        self.view_calls.load(Ordering::SeqCst)
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn submitted_calls(&self) -> Vec<FunctionCall> {
        self.submitted
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn check_error(&self) -> Result<(), HostError> {
        match &self.force_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn delay(&self, hash: &CryptoHash) {
        if let Some(delay) = self.delays.get(hash) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl HostChainClient for MockHostClient {
    async fn view_call(
        &self,
        _contract_id: &str,
        method_name: &str,
        _args: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, HostError> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        self.check_error()?;
        Ok(self.results.get(method_name).cloned())
    }

    async fn call_function(
        &self,
        signer: &dyn TransactionSigner,
        call: FunctionCall,
    ) -> Result<ExecutionOutcome, HostError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.check_error()?;
        let value = self.results.get(&call.method_name).cloned();
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(call);
        }
        Ok(ExecutionOutcome {
            transaction_hash: SUBMITTED_TX_HASH,
            signer_id: signer.account_id().to_string(),
            value,
        })
    }

    async fn create_and_deploy(
        &self,
        signer: &dyn TransactionSigner,
        account_id: &str,
        _code: Vec<u8>,
        _initial_balance: u128,
    ) -> Result<ExecutionOutcome, HostError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.check_error()?;
        if self.account_exists {
            return Err(HostError::AccountAlreadyExists(account_id.to_string()));
        }
        Ok(ExecutionOutcome {
            transaction_hash: SUBMITTED_TX_HASH,
            signer_id: signer.account_id().to_string(),
            value: None,
        })
    }

    async fn block(
        &self,
        reference: BlockReference,
    ) -> Result<NativeBlock, HostError> {
        self.check_error()?;
        let found = match reference {
            BlockReference::Latest => {
                self.blocks.get(self.latest.load(Ordering::SeqCst))
            }
            BlockReference::Height(height) => {
                self.blocks.iter().find(|b| b.height == height)
            }
            BlockReference::Hash(hash) => {
                self.blocks.iter().find(|b| b.hash == hash)
            }
        };
        found
            .cloned()
            .ok_or_else(|| HostError::UnknownBlock(format!("{reference:?}")))
    }

    async fn chunk(
        &self,
        chunk_hash: CryptoHash,
    ) -> Result<NativeChunk, HostError> {
        self.check_error()?;
        self.delay(&chunk_hash).await;
        self.chunks
            .get(&chunk_hash)
            .cloned()
            .ok_or_else(|| HostError::UnknownChunk(hex::encode(chunk_hash)))
    }

    async fn transaction(
        &self,
        hash: CryptoHash,
        sender_id: &str,
    ) -> Result<TransactionStatus, HostError> {
        self.check_error()?;
        self.delay(&hash).await;
        if self.failing_transactions.contains(&hash) {
            return Err(HostError::Transport("connection reset".to_string()));
        }
        self.transactions
            .get(&hash)
            .filter(|status| status.transaction.signer_id == sender_id)
            .cloned()
            .ok_or_else(|| HostError::UnknownTransaction(hex::encode(hash)))
    }

    async fn status(&self) -> Result<NodeStatus, HostError> {
        self.check_error()?;
        let height = self.latest_height.load(Ordering::SeqCst);
        Ok(NodeStatus {
            chain_id: "localnet".to_string(),
            sync_info: SyncInfo {
                latest_block_hash: [0; 32],
                latest_block_height: height,
                earliest_block_height: Some(1),
                syncing: self.syncing,
            },
        })
    }
}
