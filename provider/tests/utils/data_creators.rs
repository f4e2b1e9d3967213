// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::time::Duration;

use near_web3_provider::host::{
    Action, ChunkHeader, CryptoHash, ExecutionStatus, NativeBlock,
    NativeChunk, NativeTransaction, TransactionStatus,
};
use serde_json::json;

use super::{MockHostClient, EVM_CONTRACT};

pub const BLOCK_HEIGHT: u64 = 10;
/// 2020-07-21T16:55:51Z in nanoseconds.
pub const BLOCK_TIMESTAMP: u64 = 1_595_350_551_000_000_000;

pub fn hash(n: u8) -> CryptoHash {
    [n; 32]
}

pub fn hex_hash(n: u8) -> String {
    format!("0x{}", hex::encode(hash(n)))
}

/// Reference string of the transaction created by [`evm_call`].
pub fn tx_ref(n: u8, signer: &str) -> String {
    format!("{}:{signer}", hex_hash(n))
}

/// A `call_function` transaction of the EVM contract.
pub fn evm_call(n: u8, signer: &str) -> NativeTransaction {
    let args = json!({
        "contract_address": format!("{:040x}", n),
        "encoded_input": "a9059cbb",
    });
    NativeTransaction {
        hash: hash(n),
        signer_id: signer.to_string(),
        receiver_id: EVM_CONTRACT.to_string(),
        nonce: u64::from(n),
        actions: vec![Action::FunctionCall {
            method_name: "call_function".to_string(),
            args: args.to_string().into_bytes(),
            gas: 100,
            deposit: u128::from(n) * 1_000,
        }],
    }
}

pub fn executed(
    transaction: NativeTransaction,
    block_hash: CryptoHash,
) -> TransactionStatus {
    TransactionStatus {
        transaction,
        block_hash,
        status: ExecutionStatus::Success(None),
        gas_burnt: 2_428_000_000_000,
    }
}

/// A host chain with one block at [`BLOCK_HEIGHT`] (hash `0x0a..`) made of
/// two chunks:
///
/// - chunk `0xc0..` (shard 0) holds transactions 1 and 2
/// - chunk `0xc1..` (shard 1) holds transaction 3
///
/// Fetch delays are arranged so transaction and chunk fetches complete in
/// reverse order.
pub fn two_chunk_chain() -> MockHostClient {
    let block_hash = hash(0x0a);
    let txs: Vec<_> = [1, 2, 3]
        .into_iter()
        .map(|n| evm_call(n, if n == 2 { "alice.near" } else { "test.near" }))
        .collect();

    let block = NativeBlock {
        hash: block_hash,
        prev_hash: hash(0x09),
        height: BLOCK_HEIGHT,
        timestamp: BLOCK_TIMESTAMP,
        author: "node0".to_string(),
        chunks: vec![
            ChunkHeader {
                chunk_hash: hash(0xc0),
                shard_id: 0,
                gas_used: 3,
                gas_limit: 1_000,
            },
            ChunkHeader {
                chunk_hash: hash(0xc1),
                shard_id: 1,
                gas_used: 4,
                gas_limit: 1_000,
            },
        ],
    };

    let mut client = MockHostClient::default();
    client.insert_chunk(NativeChunk {
        chunk_hash: hash(0xc0),
        shard_id: 0,
        transactions: txs[..2].to_vec(),
    });
    client.insert_chunk(NativeChunk {
        chunk_hash: hash(0xc1),
        shard_id: 1,
        transactions: txs[2..].to_vec(),
    });
    for tx in txs {
        client.insert_transaction(executed(tx, block_hash));
    }
    client.insert_block(block);

    client.delays.insert(hash(0xc0), Duration::from_millis(40));
    client.delays.insert(hash(1), Duration::from_millis(60));
    client.delays.insert(hash(2), Duration::from_millis(30));
    client
}

/// A block without chunks following `parent`.
pub fn empty_block(parent: &NativeBlock, n: u8) -> NativeBlock {
    NativeBlock {
        hash: hash(n),
        prev_hash: parent.hash,
        height: parent.height + 1,
        timestamp: parent.timestamp + 1_000_000_000,
        author: "node1".to_string(),
        chunks: Vec::new(),
    }
}
