// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::Address;

/// An Ethereum transaction built from a NEAR transaction.
///
/// `hash` is the transaction reference (`<0x tx hash>:<signer>`) so it can
/// be fed back to `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    #[serde(with = "super::serde_helper::quantity")]
    pub nonce: u64,
    #[serde(with = "super::serde_helper::hash")]
    pub block_hash: [u8; 32],
    #[serde(with = "super::serde_helper::quantity")]
    pub block_number: u64,
    /// Position in the block; unknown when the transaction could not be
    /// located among the block's chunks.
    #[serde(with = "super::serde_helper::opt_quantity")]
    pub transaction_index: Option<u64>,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    #[serde(with = "super::serde_helper::big_quantity")]
    pub value: u128,
    #[serde(with = "super::serde_helper::quantity")]
    pub gas: u64,
    #[serde(with = "super::serde_helper::quantity")]
    pub gas_price: u64,
    pub input: String,
}

/// The receipt of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: String,
    #[serde(with = "super::serde_helper::opt_quantity")]
    pub transaction_index: Option<u64>,
    #[serde(with = "super::serde_helper::hash")]
    pub block_hash: [u8; 32],
    #[serde(with = "super::serde_helper::quantity")]
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "super::serde_helper::quantity")]
    pub gas_used: u64,
    #[serde(with = "super::serde_helper::quantity")]
    pub cumulative_gas_used: u64,
    /// Address of the deployed contract, for successful deployments.
    pub contract_address: Option<Address>,
    pub logs: Vec<Value>,
    pub logs_bloom: String,
    /// `1` on success, `0` on failure.
    #[serde(with = "super::serde_helper::quantity")]
    pub status: u64,
}
