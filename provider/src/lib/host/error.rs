// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Errors raised by host chain clients.

use thiserror::Error;

/// Errors related to host chain access.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum HostError {
    /// The node could not be reached or the request failed in transit.
    #[error("Host chain transport error: {0}")]
    Transport(String),
    /// The node answered with a payload that could not be understood.
    #[error("Invalid host chain response: {0}")]
    InvalidResponse(String),
    /// The referenced block does not exist (or is not known yet).
    #[error("Unknown block: {0}")]
    UnknownBlock(String),
    /// The referenced chunk does not exist.
    #[error("Unknown chunk: {0}")]
    UnknownChunk(String),
    /// The referenced transaction does not exist.
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),
    /// The transaction or view call executed and failed.
    #[error("Execution failed: {0}")]
    Execution(String),
    /// Account creation hit an existing account.
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),
    /// The signer could not produce a signed transaction.
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HostError::InvalidResponse(err.to_string())
        } else {
            HostError::Transport(err.to_string())
        }
    }
}
