// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use near_web3_provider::host::{
    HostError, TransactionSigner, UnsignedTransaction,
};

/// Signer producing a placeholder signature.
#[derive(Debug, Clone)]
pub struct MockSigner {
    account_id: String,
    public_key: String,
    /// Force an error on signing if Some.
    pub force_error: Option<HostError>,
}

impl MockSigner {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            public_key: "ed25519:DcA2MzgpJbrUATQLLceocVckhhAqrkingax4oJ9kZ847"
                .to_string(),
            force_error: None,
        }
    }
}

impl TransactionSigner for MockSigner {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, tx: &UnsignedTransaction) -> Result<Vec<u8>, HostError> {
        if let Some(err) = &self.force_error {
            return Err(err.clone());
        }
        let mut signed = tx.signer_id.as_bytes().to_vec();
        signed.extend_from_slice(&tx.nonce.to_le_bytes());
        Ok(signed)
    }
}
