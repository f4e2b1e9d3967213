// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::fmt::Debug;

use super::{Action, CryptoHash, HostError};

/// A transaction ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub signer_id: String,
    /// `ed25519:<base58>` public key of the access key in use.
    pub public_key: String,
    pub nonce: u64,
    pub receiver_id: String,
    /// Recent block hash anchoring the transaction.
    pub block_hash: CryptoHash,
    pub actions: Vec<Action>,
}

/// Credential used for state-changing calls.
///
/// Key storage lives outside this crate; implementors own the key pair and
/// return the borsh-encoded `SignedTransaction` NEAR expects.
pub trait TransactionSigner: Send + Sync + Debug {
    /// Account the credential signs for.
    fn account_id(&self) -> &str;

    /// `ed25519:<base58>` public key of the credential.
    fn public_key(&self) -> &str;

    fn sign(&self, tx: &UnsignedTransaction) -> Result<Vec<u8>, HostError>;
}
