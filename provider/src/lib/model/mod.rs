// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! # Ethereum JSON-RPC models
//!
//! Rust representations of the Ethereum objects the provider returns. They
//! are the boundary between NEAR-native data ([`crate::host`]) and the JSON
//! an Ethereum client library consumes.
//!
//! Numbers are encoded as `0x` quantities and hashes as `0x` hex through the
//! [`serde_helper`] modules. Fields NEAR has no equivalent for (uncles,
//! difficulty, blooms, trie roots) carry fixed zero values.
//!
//! ## Submodules:
//!
//! - [`block`]: blocks and their transaction lists.
//! - [`transaction`]: transactions and receipts.
//! - [`sync`]: the `eth_syncing` result.
//! - [`serde_helper`]: quantity and hash encodings.

pub mod block;
pub mod serde_helper;
pub mod sync;
pub mod transaction;

/// `0x` followed by 64 zeros.
pub const ZERO_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// An empty 2048-bit logs bloom.
pub fn empty_bloom() -> String {
    format!("0x{}", "0".repeat(512))
}
