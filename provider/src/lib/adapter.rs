// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Calls against the EVM contract.
//!
//! [`ContractCallAdapter`] turns Ethereum account, storage and call
//! operations into calls of the EVM contract account on NEAR. Each call is
//! described by a [`ContractCallDescriptor`] whose mode is fixed by its
//! entry point:
//!
//! * read-only entry points are executed as view calls and never submit a
//!   transaction;
//! * state-changing entry points are signed and submitted with
//!   [`GAS_AMOUNT`] attached. Gas supplied by the Ethereum caller is
//!   ignored.
//!
//! Arguments are JSON objects; hex values are passed without prefix. Results
//! are decoded according to the entry point's [`ReturnShape`], and a call
//! returning nothing decodes to the zero value of that shape.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::codec::{
    self, add_prefix, dec_to_hex, hex_to_dec, hex_to_u128, hex_to_u64,
    is_hex, strip_prefix, Address, KnownAccounts, TxRef,
};
use crate::error::Error;
use crate::host::{
    FunctionCall, HostChainClient, HostError, TransactionSigner,
};
use crate::registry::{EntryPoint, Mode, ReturnShape};
use crate::{Result, GAS_AMOUNT};

/// Number of hex digits in a storage word.
const WORD_HEX_LEN: usize = 64;

/// A single call of the EVM contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallDescriptor {
    pub entry_point: EntryPoint,
    /// Account signing the call; only set for state-changing calls.
    pub signer_account: Option<String>,
    pub target_contract: String,
    /// JSON-encoded arguments.
    pub args: Vec<u8>,
    pub mode: Mode,
    /// Gas requested by the caller. Informational only.
    pub gas: Option<u64>,
    pub attached_value: u128,
}

impl ContractCallDescriptor {
    /// Describes a call of `entry_point` on `target_contract`. The mode is
    /// taken from the entry point.
    pub fn new<A: Serialize>(
        entry_point: EntryPoint,
        target_contract: impl Into<String>,
        args: &A,
    ) -> Result<Self> {
        Ok(Self {
            entry_point,
            signer_account: None,
            target_contract: target_contract.into(),
            args: serde_json::to_vec(args)?,
            mode: entry_point.mode(),
            gas: None,
            attached_value: 0,
        })
    }

    pub fn with_signer(mut self, account: impl Into<String>) -> Self {
        self.signer_account = Some(account.into());
        self
    }

    pub fn with_gas(mut self, gas: Option<u64>) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.attached_value = value;
        self
    }
}

/// What executing a descriptor produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    /// Decoded result of a view call.
    View(Value),
    /// A submitted transaction and its decoded return value.
    Submitted { tx_ref: TxRef, value: Value },
}

impl CallOutput {
    pub fn into_value(self) -> Value {
        match self {
            CallOutput::View(value) => value,
            CallOutput::Submitted { value, .. } => value,
        }
    }
}

/// Transaction object of `eth_sendTransaction`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: Option<String>,
    pub gas: Option<String>,
    pub data: Option<String>,
    pub input: Option<String>,
}

/// Call object of `eth_call`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub data: Option<String>,
    pub input: Option<String>,
}

fn payload(data: &Option<String>, input: &Option<String>) -> Result<String> {
    let raw = input.as_deref().or(data.as_deref()).unwrap_or_default();
    if !is_hex(raw) {
        return Err(Error::InvalidArgument(format!("invalid input {raw}")));
    }
    Ok(strip_prefix(raw).to_lowercase())
}

fn parse_address(value: &Option<String>) -> Result<Option<Address>> {
    value.as_deref().map(str::parse).transpose()
}

#[derive(Serialize)]
struct AddressArgs {
    address: String,
}

#[derive(Serialize)]
struct StorageArgs {
    address: String,
    key: String,
}

#[derive(Serialize)]
struct CallArgs {
    contract_address: String,
    encoded_input: String,
}

#[derive(Serialize)]
struct DeployArgs {
    bytecode: String,
}

#[derive(Serialize)]
struct TransferArgs {
    address: String,
    amount: String,
}

#[derive(Serialize)]
struct AmountArgs {
    amount: String,
}

/// Executes calls of the EVM contract.
#[derive(Debug, Clone)]
pub struct ContractCallAdapter {
    client: Arc<dyn HostChainClient>,
    evm_contract: String,
    signer: Option<Arc<dyn TransactionSigner>>,
    known_accounts: KnownAccounts,
}

impl ContractCallAdapter {
    pub fn new(
        client: Arc<dyn HostChainClient>,
        evm_contract: impl Into<String>,
        signer: Option<Arc<dyn TransactionSigner>>,
    ) -> Self {
        let known_accounts = KnownAccounts::new(
            signer.iter().map(|s| s.account_id().to_string()),
        );
        Self {
            client,
            evm_contract: evm_contract.into(),
            signer,
            known_accounts,
        }
    }

    pub fn evm_contract(&self) -> &str {
        &self.evm_contract
    }

    /// Accounts this adapter can sign for.
    pub fn known_accounts(&self) -> &KnownAccounts {
        &self.known_accounts
    }

    /// Builds a descriptor targeting the EVM contract. State-changing
    /// descriptors are attributed to the configured signer.
    pub fn descriptor<A: Serialize>(
        &self,
        entry_point: EntryPoint,
        args: &A,
    ) -> Result<ContractCallDescriptor> {
        let descriptor =
            ContractCallDescriptor::new(entry_point, &self.evm_contract, args)?;
        Ok(match (entry_point.mode(), &self.signer) {
            (Mode::StateChanging, Some(signer)) => {
                descriptor.with_signer(signer.account_id())
            }
            _ => descriptor,
        })
    }

    /// Executes a call and decodes its result.
    pub async fn execute(
        &self,
        descriptor: ContractCallDescriptor,
    ) -> Result<CallOutput> {
        let entry_point = descriptor.entry_point;
        if descriptor.mode != entry_point.mode() {
            return Err(Error::InvalidArgument(format!(
                "{entry_point} cannot be executed as {:?}",
                descriptor.mode
            )));
        }
        let shape = entry_point.return_shape();

        match descriptor.mode {
            Mode::ReadOnly => {
                debug!(
                    contract = %descriptor.target_contract,
                    %entry_point,
                    "View call"
                );
                let raw = self
                    .client
                    .view_call(
                        &descriptor.target_contract,
                        entry_point.wire_name(),
                        descriptor.args,
                    )
                    .await?;
                Ok(CallOutput::View(decode_result(shape, raw.as_deref())?))
            }
            Mode::StateChanging => {
                let signer =
                    self.require_signer(descriptor.signer_account.as_deref())?;
                if let Some(requested) = descriptor.gas {
                    debug!(requested, attached = GAS_AMOUNT, "Ignoring gas");
                }
                debug!(
                    contract = %descriptor.target_contract,
                    %entry_point,
                    signer = signer.account_id(),
                    value = %descriptor.attached_value,
                    "Submitting call"
                );
                let call = FunctionCall {
                    receiver_id: descriptor.target_contract,
                    method_name: entry_point.wire_name().to_string(),
                    args: descriptor.args,
                    gas: GAS_AMOUNT,
                    deposit: descriptor.attached_value,
                };
                let outcome =
                    self.client.call_function(signer.as_ref(), call).await?;
                let value = decode_result(shape, outcome.value.as_deref())?;
                let tx_hash = add_prefix(&hex::encode(outcome.transaction_hash));
                Ok(CallOutput::Submitted {
                    tx_ref: TxRef::new(tx_hash, outcome.signer_id),
                    value,
                })
            }
        }
    }

    /// Creates the EVM contract account and deploys `code` to it.
    ///
    /// Returns `false` when the account already existed, which is not an
    /// error.
    pub async fn ensure_evm_deployed(
        &self,
        code: Vec<u8>,
        initial_balance: u128,
    ) -> Result<bool> {
        let signer = self.require_signer(None)?;
        let deployed = self
            .client
            .create_and_deploy(
                signer.as_ref(),
                &self.evm_contract,
                code,
                initial_balance,
            )
            .await;
        match deployed {
            Ok(_) => {
                info!(contract = %self.evm_contract, "EVM contract deployed");
                Ok(true)
            }
            Err(HostError::AccountAlreadyExists(account)) => {
                warn!(%account, "EVM contract account exists, skipping deploy");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_balance(&self, address: &Address) -> Result<Value> {
        self.view(EntryPoint::GetBalance, &address_args(address)).await
    }

    pub async fn get_nonce(&self, address: &Address) -> Result<Value> {
        self.view(EntryPoint::GetNonce, &address_args(address)).await
    }

    pub async fn get_code(&self, address: &Address) -> Result<Value> {
        self.view(EntryPoint::GetCode, &address_args(address)).await
    }

    pub async fn get_storage_at(
        &self,
        address: &Address,
        key: &str,
    ) -> Result<Value> {
        let args = StorageArgs {
            address: address.to_raw_hex(),
            key: storage_key(key)?,
        };
        self.view(EntryPoint::GetStorageAt, &args).await
    }

    /// Executes `eth_call` as a view call.
    pub async fn call(&self, request: &CallRequest) -> Result<Value> {
        let to = parse_address(&request.to)?.ok_or_else(|| {
            Error::InvalidArgument("eth_call requires `to`".to_string())
        })?;
        // `from` is validated but a view call has no sender
        parse_address(&request.from)?;
        let args = CallArgs {
            contract_address: to.to_raw_hex(),
            encoded_input: payload(&request.data, &request.input)?,
        };
        self.view(EntryPoint::ViewCallFunction, &args).await
    }

    /// Executes `eth_sendTransaction`.
    ///
    /// A transaction without `to` deploys its data as bytecode, one with
    /// data calls the target contract, and one without data transfers
    /// `value` to the target.
    pub async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<CallOutput> {
        let from = parse_address(&request.from)?;
        self.check_sender(from.as_ref())?;

        let to = parse_address(&request.to)?;
        let value = request
            .value
            .as_deref()
            .map(hex_to_u128)
            .transpose()?
            .unwrap_or_default();
        let gas = request.gas.as_deref().map(hex_to_u64).transpose()?;
        let data = payload(&request.data, &request.input)?;

        let descriptor = match to {
            None if data.is_empty() => {
                return Err(Error::InvalidArgument(
                    "contract creation without bytecode".to_string(),
                ));
            }
            None => self
                .descriptor(EntryPoint::DeployCode, &DeployArgs {
                    bytecode: data,
                })?
                .with_value(value),
            Some(to) if data.is_empty() => {
                self.descriptor(EntryPoint::Transfer, &TransferArgs {
                    address: to.to_raw_hex(),
                    amount: value.to_string(),
                })?
            }
            Some(to) => self
                .descriptor(EntryPoint::CallFunction, &CallArgs {
                    contract_address: to.to_raw_hex(),
                    encoded_input: data,
                })?
                .with_value(value),
        };
        self.execute(descriptor.with_gas(gas)).await
    }

    /// Moves `value` yoctoNEAR into the EVM balance of `address`, defaulting
    /// to the signer's own address.
    pub async fn deposit(
        &self,
        value: u128,
        address: Option<Address>,
    ) -> Result<CallOutput> {
        let signer = self.require_signer(None)?;
        let address = address.unwrap_or_else(|| {
            codec::account_id_to_address(signer.account_id())
        });
        let descriptor = self
            .descriptor(EntryPoint::Deposit, &address_args(&address))?
            .with_value(value);
        self.execute(descriptor).await
    }

    /// Withdraws `amount` from the signer's EVM balance back to NEAR.
    pub async fn withdraw(&self, amount: u128) -> Result<CallOutput> {
        let descriptor = self.descriptor(EntryPoint::Withdraw, &AmountArgs {
            amount: amount.to_string(),
        })?;
        self.execute(descriptor).await
    }

    async fn view<A: Serialize>(
        &self,
        entry_point: EntryPoint,
        args: &A,
    ) -> Result<Value> {
        let descriptor = self.descriptor(entry_point, args)?;
        self.execute(descriptor).await.map(CallOutput::into_value)
    }

    fn require_signer(
        &self,
        requested: Option<&str>,
    ) -> Result<Arc<dyn TransactionSigner>> {
        let signer = self.signer.clone().ok_or_else(|| {
            Error::SignerMismatch("no signing credential configured".into())
        })?;
        match requested {
            Some(account) if account != signer.account_id() => {
                Err(Error::SignerMismatch(format!(
                    "no credential for {account}, signer is {}",
                    signer.account_id()
                )))
            }
            _ => Ok(signer),
        }
    }

    /// Checks an Ethereum `from` address against the signer.
    fn check_sender(&self, from: Option<&Address>) -> Result<()> {
        let signer = self.require_signer(None)?;
        let Some(from) = from else {
            return Ok(());
        };
        match self.known_accounts.account_id(from) {
            Some(account) if account == signer.account_id() => Ok(()),
            _ => Err(Error::SignerMismatch(format!(
                "{from} is not the address of {}",
                signer.account_id()
            ))),
        }
    }
}

fn address_args(address: &Address) -> AddressArgs {
    AddressArgs {
        address: address.to_raw_hex(),
    }
}

/// Normalizes a storage slot to a 32-byte word without prefix.
fn storage_key(key: &str) -> Result<String> {
    let raw = strip_prefix(key);
    if !is_hex(raw) || raw.len() > WORD_HEX_LEN {
        return Err(Error::InvalidArgument(format!("invalid storage key {key}")));
    }
    Ok(format!("{:0>WORD_HEX_LEN$}", raw.to_lowercase()))
}

fn unusable(shape: ReturnShape, value: &Value) -> Error {
    Error::TransportFailure(format!(
        "EVM contract returned {value} for a {shape:?} result"
    ))
}

/// Decodes a raw contract result according to its shape.
///
/// `None`, JSON `null` and the empty string are the zero value of the
/// shape: `0x0`, a zero word, or `0x`.
pub fn decode_result(shape: ReturnShape, raw: Option<&[u8]>) -> Result<Value> {
    let parsed = match raw {
        None => Value::Null,
        Some(bytes) => match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => value,
            Err(_) if shape == ReturnShape::Unit => return Ok(Value::Null),
            // Raw return data of an EVM call
            Err(_) if shape == ReturnShape::Bytes => {
                return Ok(Value::String(add_prefix(&hex::encode(bytes))));
            }
            Err(e) => {
                return Err(Error::TransportFailure(format!(
                    "undecodable {shape:?} result: {e}"
                )));
            }
        },
    };

    let decoded = match (shape, &parsed) {
        (ReturnShape::Unit, _) => return Ok(Value::Null),
        (ReturnShape::Integer, Value::Null) => "0x0".to_string(),
        (ReturnShape::Integer, Value::Number(n)) => {
            let n = n.as_u64().ok_or_else(|| unusable(shape, &parsed))?;
            codec::quantity(n)
        }
        (ReturnShape::Integer, Value::String(s)) if s.is_empty() => {
            "0x0".to_string()
        }
        (ReturnShape::Integer, Value::String(s)) => {
            let decimal = if s.starts_with("0x") {
                hex_to_dec(s)
            } else {
                Ok(s.clone())
            };
            decimal
                .and_then(|d| dec_to_hex(&d))
                .map_err(|_| unusable(shape, &parsed))?
        }
        (ReturnShape::Word, Value::Null) => zero_word(),
        (ReturnShape::Word, Value::String(s)) => {
            let raw = strip_prefix(s);
            if !is_hex(raw) || raw.len() > WORD_HEX_LEN {
                return Err(unusable(shape, &parsed));
            }
            format!("0x{:0>WORD_HEX_LEN$}", raw.to_lowercase())
        }
        (ReturnShape::Bytes, Value::Null) => "0x".to_string(),
        (ReturnShape::Bytes, Value::String(s)) if is_hex(s) => {
            add_prefix(&strip_prefix(s).to_lowercase())
        }
        (ReturnShape::Bytes, Value::Array(items)) => {
            let bytes = items
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| unusable(shape, &parsed))?;
            add_prefix(&hex::encode(bytes))
        }
        _ => return Err(unusable(shape, &parsed)),
    };
    Ok(Value::String(decoded))
}

fn zero_word() -> String {
    format!("0x{}", "0".repeat(WORD_HEX_LEN))
}
