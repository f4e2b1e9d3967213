// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! The closed set of RPC methods the provider answers.
//!
//! [`Method`] enumerates every supported method at compile time. Parsing a
//! method name is the registry lookup: an unknown name fails with
//! [`Error::MethodNotSupported`], it is never ignored. [`Method::spec`]
//! describes how a method is executed (read-only or state-changing), which
//! component handles it and how many positional parameters it takes.
//!
//! [`EntryPoint`] lists the methods of the EVM contract. Their wire names
//! are shared with the contract and must not change.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Whether executing a call may mutate host chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Answered with a view call; never submits a transaction.
    ReadOnly,
    /// Submitted as a signed transaction with fixed gas.
    StateChanging,
}

/// Shape of the value an EVM contract entry point returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// An unsigned integer, rendered as a hex quantity.
    Integer,
    /// A 32-byte storage word.
    Word,
    /// Variable-length bytes.
    Bytes,
    /// No meaningful value.
    Unit,
}

/// Entry points of the EVM contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    DeployCode,
    CallFunction,
    ViewCallFunction,
    Deposit,
    Withdraw,
    Transfer,
    GetBalance,
    GetStorageAt,
    GetCode,
    GetNonce,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 10] = [
        EntryPoint::DeployCode,
        EntryPoint::CallFunction,
        EntryPoint::ViewCallFunction,
        EntryPoint::Deposit,
        EntryPoint::Withdraw,
        EntryPoint::Transfer,
        EntryPoint::GetBalance,
        EntryPoint::GetStorageAt,
        EntryPoint::GetCode,
        EntryPoint::GetNonce,
    ];

    /// The method name on the EVM contract.
    pub const fn wire_name(self) -> &'static str {
        match self {
            EntryPoint::DeployCode => "deploy_code",
            EntryPoint::CallFunction => "call_function",
            EntryPoint::ViewCallFunction => "view_call_function",
            EntryPoint::Deposit => "deposit",
            EntryPoint::Withdraw => "withdraw",
            EntryPoint::Transfer => "transfer",
            EntryPoint::GetBalance => "get_balance",
            EntryPoint::GetStorageAt => "get_storage_at",
            EntryPoint::GetCode => "get_code",
            EntryPoint::GetNonce => "get_nonce",
        }
    }

    pub const fn mode(self) -> Mode {
        match self {
            EntryPoint::ViewCallFunction
            | EntryPoint::GetBalance
            | EntryPoint::GetStorageAt
            | EntryPoint::GetCode
            | EntryPoint::GetNonce => Mode::ReadOnly,
            EntryPoint::DeployCode
            | EntryPoint::CallFunction
            | EntryPoint::Deposit
            | EntryPoint::Withdraw
            | EntryPoint::Transfer => Mode::StateChanging,
        }
    }

    pub const fn return_shape(self) -> ReturnShape {
        match self {
            EntryPoint::GetBalance | EntryPoint::GetNonce => {
                ReturnShape::Integer
            }
            EntryPoint::GetStorageAt => ReturnShape::Word,
            EntryPoint::GetCode
            | EntryPoint::ViewCallFunction
            | EntryPoint::CallFunction
            | EntryPoint::DeployCode => ReturnShape::Bytes,
            EntryPoint::Deposit
            | EntryPoint::Withdraw
            | EntryPoint::Transfer => ReturnShape::Unit,
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Component answering a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Provider constants or node status.
    Node,
    /// A single EVM contract entry point.
    Contract(EntryPoint),
    /// A state-changing contract call whose entry point (deploy, call or
    /// transfer) follows from the shape of the transaction object.
    SendTransaction,
    /// The block/transaction synthesizer.
    Block,
}

/// Number of positional parameters a method accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamShape {
    pub required: usize,
    pub optional: usize,
}

impl ParamShape {
    const fn new(required: usize, optional: usize) -> Self {
        Self { required, optional }
    }

    /// Validates a parameter count.
    pub fn check(&self, method: Method, count: usize) -> Result<(), Error> {
        let max = self.required + self.optional;
        if count < self.required || count > max {
            let expected = if self.optional == 0 {
                format!("{}", self.required)
            } else {
                format!("{} to {max}", self.required)
            };
            return Err(Error::InvalidArgument(format!(
                "{method} expects {expected} params, got {count}"
            )));
        }
        Ok(())
    }
}

/// Registry entry of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    pub mode: Mode,
    pub handler: Handler,
    pub params: ParamShape,
}

macro_rules! methods {
    ($($variant:ident => $name:literal,)*) => {
        /// Every RPC method the provider answers.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Method {
            $($variant,)*
        }

        impl Method {
            pub const ALL: &'static [Method] = &[$(Method::$variant,)*];

            /// The RPC method name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Method::$variant => $name,)*
                }
            }
        }

        impl FromStr for Method {
            type Err = Error;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $($name => Ok(Method::$variant),)*
                    _ => Err(Error::MethodNotSupported(name.to_string())),
                }
            }
        }
    };
}

methods! {
    NetVersion => "net_version",
    NetListening => "net_listening",
    Web3ClientVersion => "web3_clientVersion",
    Syncing => "eth_syncing",
    GasPrice => "eth_gasPrice",
    Accounts => "eth_accounts",
    BlockNumber => "eth_blockNumber",
    GetBalance => "eth_getBalance",
    GetStorageAt => "eth_getStorageAt",
    GetCode => "eth_getCode",
    GetTransactionCount => "eth_getTransactionCount",
    Call => "eth_call",
    SendTransaction => "eth_sendTransaction",
    Deposit => "near_deposit",
    Withdraw => "near_withdraw",
    GetBlockByHash => "eth_getBlockByHash",
    GetBlockByNumber => "eth_getBlockByNumber",
    GetBlockTransactionCountByHash => "eth_getBlockTransactionCountByHash",
    GetBlockTransactionCountByNumber => "eth_getBlockTransactionCountByNumber",
    GetTransactionByHash => "eth_getTransactionByHash",
    GetTransactionByBlockHashAndIndex => "eth_getTransactionByBlockHashAndIndex",
    GetTransactionByBlockNumberAndIndex => "eth_getTransactionByBlockNumberAndIndex",
    GetTransactionReceipt => "eth_getTransactionReceipt",
}

impl Method {
    pub const fn spec(self) -> MethodSpec {
        use Handler::*;
        use Mode::*;

        let (mode, handler, params) = match self {
            Method::NetVersion
            | Method::NetListening
            | Method::Web3ClientVersion
            | Method::Syncing
            | Method::GasPrice
            | Method::Accounts => (ReadOnly, Node, ParamShape::new(0, 0)),
            Method::BlockNumber => (ReadOnly, Block, ParamShape::new(0, 0)),
            Method::GetBalance => (
                ReadOnly,
                Contract(EntryPoint::GetBalance),
                ParamShape::new(1, 1),
            ),
            Method::GetStorageAt => (
                ReadOnly,
                Contract(EntryPoint::GetStorageAt),
                ParamShape::new(2, 1),
            ),
            Method::GetCode => (
                ReadOnly,
                Contract(EntryPoint::GetCode),
                ParamShape::new(1, 1),
            ),
            Method::GetTransactionCount => (
                ReadOnly,
                Contract(EntryPoint::GetNonce),
                ParamShape::new(1, 1),
            ),
            Method::Call => (
                ReadOnly,
                Contract(EntryPoint::ViewCallFunction),
                ParamShape::new(1, 1),
            ),
            Method::SendTransaction => {
                (StateChanging, SendTransaction, ParamShape::new(1, 0))
            }
            Method::Deposit => (
                StateChanging,
                Contract(EntryPoint::Deposit),
                ParamShape::new(1, 1),
            ),
            Method::Withdraw => (
                StateChanging,
                Contract(EntryPoint::Withdraw),
                ParamShape::new(1, 0),
            ),
            Method::GetBlockByHash | Method::GetBlockByNumber => {
                (ReadOnly, Block, ParamShape::new(1, 1))
            }
            Method::GetBlockTransactionCountByHash
            | Method::GetBlockTransactionCountByNumber
            | Method::GetTransactionByHash
            | Method::GetTransactionReceipt => {
                (ReadOnly, Block, ParamShape::new(1, 0))
            }
            Method::GetTransactionByBlockHashAndIndex
            | Method::GetTransactionByBlockNumberAndIndex => {
                (ReadOnly, Block, ParamShape::new(2, 0))
            }
        };

        MethodSpec {
            mode,
            handler,
            params,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
