// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Ethereum JSON-RPC provider backed by a NEAR-hosted EVM contract.
//!
//! Every `eth_*` request is rewritten into either a call against the EVM
//! contract account (see [`adapter`]) or a native NEAR block/chunk query
//! reshaped into Ethereum objects (see [`synthesizer`]). The entry point is
//! [`provider::NearProvider`]; [`rpc`] exposes it as a `jsonrpsee` server.

pub mod adapter;
pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod provider;
pub mod registry;
pub mod rpc;
pub mod synthesizer;

pub use crate::error::Error;
pub use crate::provider::NearProvider;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Gas attached to every state-changing call on the EVM contract.
pub const GAS_AMOUNT: u64 = 300_000_000_000_000;

/// The all-zero Ethereum address.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// `net_version` reported for production networks.
pub const NEAR_NET_VERSION: &str = "99";

/// `net_version` reported for the `local` and `test` networks.
pub const NEAR_NET_VERSION_TEST: &str = "98";

/// Account hosting the EVM contract when none is configured.
pub const DEFAULT_EVM_CONTRACT: &str = "evm";
