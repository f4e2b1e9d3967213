// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

#![allow(dead_code)]

pub mod data_creators;
pub mod host_client_mock;
pub mod signer_mock;

use std::sync::Arc;

use near_web3_provider::host::{HostChainClient, TransactionSigner};
use near_web3_provider::NearProvider;

pub use data_creators::*;
pub use host_client_mock::MockHostClient;
pub use signer_mock::MockSigner;

pub const EVM_CONTRACT: &str = "evm";
pub const SIGNER: &str = "test.near";
/// Address derived from [`SIGNER`].
pub const SIGNER_ADDRESS: &str = "0xcbda96b3f2b8eb962f97ae50c3852ca976740e2b";

/// A provider on the `local` network signing as [`SIGNER`].
pub fn provider_with_signer(client: Arc<MockHostClient>) -> NearProvider {
    let signer: Arc<dyn TransactionSigner> = Arc::new(MockSigner::new(SIGNER));
    let client: Arc<dyn HostChainClient> = client;
    NearProvider::new(client, EVM_CONTRACT, "local", Some(signer))
}

/// A read-only provider.
pub fn provider_without_signer(
    client: Arc<MockHostClient>,
    network_id: &str,
) -> NearProvider {
    let client: Arc<dyn HostChainClient> = client;
    NearProvider::new(client, EVM_CONTRACT, network_id, None)
}
