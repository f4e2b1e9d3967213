// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};

use super::transaction::Transaction;
use super::{empty_bloom, ZERO_HASH};
use crate::codec::Address;

/// Keccak of the RLP encoding of an empty uncle list.
pub const EMPTY_UNCLES_HASH: &str =
    "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347";

const ZERO_NONCE: &str = "0x0000000000000000";

/// Transactions of a block, either as references or as full objects.
///
/// References are `<0x tx hash>:<signer account id>` strings; both shapes
/// keep chunk-then-index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Refs(Vec<String>),
    Full(Vec<Transaction>),
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Refs(refs) => refs.len(),
            BlockTransactions::Full(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An Ethereum block synthesized from a NEAR block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// NEAR block height.
    #[serde(with = "super::serde_helper::quantity")]
    pub number: u64,
    #[serde(with = "super::serde_helper::hash")]
    pub hash: [u8; 32],
    #[serde(with = "super::serde_helper::hash")]
    pub parent_hash: [u8; 32],
    pub nonce: String,
    pub sha3_uncles: String,
    pub logs_bloom: String,
    pub transactions_root: String,
    pub state_root: String,
    pub receipts_root: String,
    /// Address derived from the block producer's account.
    pub miner: Address,
    #[serde(with = "super::serde_helper::quantity")]
    pub difficulty: u64,
    #[serde(with = "super::serde_helper::quantity")]
    pub total_difficulty: u64,
    pub extra_data: String,
    #[serde(with = "super::serde_helper::quantity")]
    pub size: u64,
    /// Sum of the chunk gas limits.
    #[serde(with = "super::serde_helper::quantity")]
    pub gas_limit: u64,
    /// Sum of the chunk gas used.
    #[serde(with = "super::serde_helper::quantity")]
    pub gas_used: u64,
    /// Seconds since the unix epoch.
    #[serde(with = "super::serde_helper::quantity")]
    pub timestamp: u64,
    pub transactions: BlockTransactions,
    pub uncles: Vec<String>,
}

impl Block {
    /// A block with the fields NEAR has no counterpart for zeroed.
    pub fn new(
        number: u64,
        hash: [u8; 32],
        parent_hash: [u8; 32],
        miner: Address,
        timestamp: u64,
        transactions: BlockTransactions,
    ) -> Self {
        Self {
            number,
            hash,
            parent_hash,
            nonce: ZERO_NONCE.to_string(),
            sha3_uncles: EMPTY_UNCLES_HASH.to_string(),
            logs_bloom: empty_bloom(),
            transactions_root: ZERO_HASH.to_string(),
            state_root: ZERO_HASH.to_string(),
            receipts_root: ZERO_HASH.to_string(),
            miner,
            difficulty: 0,
            total_difficulty: 0,
            extra_data: "0x".to_string(),
            size: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp,
            transactions,
            uncles: Vec::new(),
        }
    }

    pub fn with_gas(mut self, gas_used: u64, gas_limit: u64) -> Self {
        self.gas_used = gas_used;
        self.gas_limit = gas_limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_ethereum_field_names() {
        let block = Block::new(
            12,
            [1; 32],
            [0; 32],
            Address::default(),
            1_595_350_551,
            BlockTransactions::Refs(vec!["0x01:alice.near".into()]),
        )
        .with_gas(10, 20);

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["number"], json!("0xc"));
        assert_eq!(value["parentHash"], json!(ZERO_HASH));
        assert_eq!(value["gasUsed"], json!("0xa"));
        assert_eq!(value["gasLimit"], json!("0x14"));
        assert_eq!(value["timestamp"], json!("0x5f171e17"));
        assert_eq!(value["miner"], json!(crate::ZERO_ADDRESS));
        assert_eq!(value["transactions"], json!(["0x01:alice.near"]));
        assert_eq!(value["uncles"], json!([]));
    }
}
