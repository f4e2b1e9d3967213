// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Central error handling for the provider.
//!
//! Every operation in the crate returns `Result<T, error::Error>`. Errors
//! raised by the host chain layer ([`crate::host::HostError`]) are folded
//! into one of the categories below through `From`, so callers only ever
//! observe:
//!
//! * `InvalidArgument` - malformed address, hex, account id, block tag or a
//!   parameter of the wrong JSON type. Raised before any host chain call.
//! * `MethodNotSupported` - the method name is not in the registry.
//! * `NotFound` - unresolved block, chunk or transaction reference.
//! * `ContractExecutionFailed` - the host chain reported an execution error
//!   or revert.
//! * `TransportFailure` - the host chain RPC could not be reached or
//!   answered with something unusable.
//! * `SignerMismatch` - a state-changing call had no usable credential.
//!
//! [`Error::into_error_object`] is the single point mapping these onto
//! JSON-RPC error codes.

use jsonrpsee::types::{error::ErrorCode, ErrorObjectOwned};
use thiserror::Error;

use crate::host::HostError;

/// Central error type of the provider.
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested RPC method has no registry entry.
    #[error("Method not supported: {0}")]
    MethodNotSupported(String),

    /// A block or transaction reference did not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The host chain executed the call and reported a failure.
    #[error("Contract execution failed: {0}")]
    ContractExecutionFailed(String),

    /// The host chain could not be reached or replied with garbage.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// No credential is available for the requested signer.
    #[error("Signer mismatch: {0}")]
    SignerMismatch(String),

    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<HostError> for Error {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Transport(_) | HostError::InvalidResponse(_) => {
                Error::TransportFailure(err.to_string())
            }
            HostError::UnknownBlock(_)
            | HostError::UnknownChunk(_)
            | HostError::UnknownTransaction(_) => {
                Error::NotFound(err.to_string())
            }
            HostError::Execution(_) | HostError::AccountAlreadyExists(_) => {
                Error::ContractExecutionFailed(err.to_string())
            }
            HostError::Signing(_) => Error::SignerMismatch(err.to_string()),
        }
    }
}

impl Error {
    /// Converts the error into a `jsonrpsee` error object.
    ///
    /// Standard codes are used where JSON-RPC defines one; the remaining
    /// categories get dedicated server error codes so clients can tell them
    /// apart without parsing messages.
    ///
    /// ```rust
    /// use near_web3_provider::Error;
    ///
    /// let err = Error::MethodNotSupported("eth_mining".to_string());
    /// let object = err.into_error_object();
    ///
    /// assert_eq!(object.code(), -32601);
    /// assert_eq!(object.message(), "Method not supported: eth_mining");
    /// ```
    pub fn into_error_object(&self) -> ErrorObjectOwned {
        let code = match self {
            Error::InvalidArgument(_) => ErrorCode::InvalidParams,
            Error::MethodNotSupported(_) => ErrorCode::MethodNotFound,
            Error::NotFound(_) => ErrorCode::ServerError(-32004),
            Error::ContractExecutionFailed(_) => ErrorCode::ServerError(-32003),
            Error::TransportFailure(_) => ErrorCode::ServerError(-32006),
            Error::SignerMismatch(_) => ErrorCode::ServerError(-32007),
            Error::Serialization(_) => ErrorCode::InternalError,
        };

        ErrorObjectOwned::owned(code.code(), self.to_string(), None::<()>)
    }
}

impl From<Error> for ErrorObjectOwned {
    fn from(err: Error) -> Self {
        err.into_error_object()
    }
}
