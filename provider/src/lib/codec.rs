// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Conversions between the Ethereum and NEAR encoding schemes.
//!
//! Everything here is pure. Functions that can fail return
//! [`Error::InvalidArgument`]; the rest are total.
//!
//! Two address operations live here and are kept apart on purpose:
//! [`account_id_to_address`] is a one-way keccak derivation that works for
//! any account, while [`KnownAccounts`] is a fixed table that can only map
//! back the accounts it was built from.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::error::Error;
use crate::Result;

const HEX_PREFIX: &str = "0x";

/// Minimum length of a NEAR account id.
pub const MIN_ACCOUNT_ID_LEN: usize = 2;
/// Maximum length of a NEAR account id.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Borrows `value` as a string, or fails with `InvalidArgument`.
///
/// JSON request parameters are untyped; this is the boundary where
/// non-string inputs are rejected before they reach any codec function.
pub fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Error::InvalidArgument(format!("{what} must be a string, got {value}"))
    })
}

/// Removes a leading `0x`, if any.
pub fn strip_prefix(hex: &str) -> &str {
    hex.strip_prefix(HEX_PREFIX).unwrap_or(hex)
}

/// Prepends `0x` unless the value already carries it.
pub fn add_prefix(hex: &str) -> String {
    if hex.starts_with(HEX_PREFIX) {
        hex.to_string()
    } else {
        format!("{HEX_PREFIX}{hex}")
    }
}

/// Returns whether `s` is hex after optional prefix removal. The empty
/// string is hex.
pub fn is_hex(s: &str) -> bool {
    strip_prefix(s).chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks a NEAR account id against the naming policy.
pub fn is_valid_account_id(s: &str) -> bool {
    if !(MIN_ACCOUNT_ID_LEN..=MAX_ACCOUNT_ID_LEN).contains(&s.len()) {
        return false;
    }
    let allowed = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || "-_.".contains(c)
    };
    if !s.chars().all(allowed) {
        return false;
    }
    if s.contains("..") {
        return false;
    }
    let edge = |c: char| c == '.' || c == '-';
    !s.starts_with(edge) && !s.ends_with(edge)
}

/// Derives the Ethereum address of a NEAR account.
///
/// The address is the last 20 bytes of `keccak256(lowercase(account_id))`.
/// This derivation is shared with the EVM contract and must stay
/// bit-for-bit stable.
pub fn account_id_to_address(account_id: &str) -> Address {
    let digest = Keccak256::digest(account_id.to_lowercase().as_bytes());
    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(&digest[digest.len() - Address::LEN..]);
    Address(bytes)
}

/// Decodes hex with an optional prefix.
pub fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    let raw = strip_prefix(hex);
    // Quantities such as `0x1` are valid but have an odd number of digits
    let padded;
    let raw = if raw.len() % 2 == 1 {
        padded = format!("0{raw}");
        padded.as_str()
    } else {
        raw
    };
    hex::decode(raw)
        .map_err(|e| Error::InvalidArgument(format!("invalid hex {hex}: {e}")))
}

/// Base58 (NEAR hashes) to prefixed hex.
pub fn base58_to_hex(value: &str) -> Result<String> {
    let bytes = bs58::decode(value).into_vec().map_err(|e| {
        Error::InvalidArgument(format!("invalid base58 {value}: {e}"))
    })?;
    Ok(add_prefix(&hex::encode(bytes)))
}

/// Hex (prefixed or not) to base58.
pub fn hex_to_base58(value: &str) -> Result<String> {
    Ok(bs58::encode(decode_hex(value)?).into_string())
}

/// Base64 to prefixed hex.
pub fn base64_to_hex(value: &str) -> Result<String> {
    Ok(add_prefix(&hex::encode(decode_base64(value)?)))
}

/// Base64 to the UTF-8 string it encodes.
pub fn base64_to_string(value: &str) -> Result<String> {
    String::from_utf8(decode_base64(value)?).map_err(|e| {
        Error::InvalidArgument(format!("base64 payload is not utf-8: {e}"))
    })
}

pub(crate) fn decode_base64(value: &str) -> Result<Vec<u8>> {
    BASE64.decode(value).map_err(|e| {
        Error::InvalidArgument(format!("invalid base64 {value}: {e}"))
    })
}

/// Decimal string to prefixed hex, without leading zeros.
pub fn dec_to_hex(value: &str) -> Result<String> {
    let n = BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        Error::InvalidArgument(format!("invalid decimal {value}"))
    })?;
    Ok(format!("{HEX_PREFIX}{}", n.to_str_radix(16)))
}

/// Hex (prefixed or not) to a decimal string.
pub fn hex_to_dec(value: &str) -> Result<String> {
    let raw = strip_prefix(value);
    let raw = if raw.is_empty() { "0" } else { raw };
    let n = BigUint::parse_bytes(raw.as_bytes(), 16)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid hex {value}")))?;
    Ok(n.to_str_radix(10))
}

/// Parses a hex quantity into a `u64`.
pub fn hex_to_u64(value: &str) -> Result<u64> {
    let raw = strip_prefix(value);
    u64::from_str_radix(raw, 16).map_err(|e| {
        Error::InvalidArgument(format!("invalid quantity {value}: {e}"))
    })
}

/// Parses a hex quantity into a `u128`. The empty quantity is zero.
pub fn hex_to_u128(value: &str) -> Result<u128> {
    let raw = strip_prefix(value);
    if raw.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(raw, 16).map_err(|e| {
        Error::InvalidArgument(format!("invalid quantity {value}: {e}"))
    })
}

/// Formats a number as an Ethereum hex quantity.
pub fn quantity(value: impl Into<u128>) -> String {
    format!("{HEX_PREFIX}{:x}", value.into())
}

/// Converts a NEAR nanosecond timestamp to whole seconds.
pub fn convert_timestamp(nanos: u64) -> u64 {
    nanos / 1_000_000_000
}

/// A transaction reference as handed out in block transaction lists.
///
/// NEAR resolves a transaction only by `(hash, signer)`, so references
/// travel as `<hash>:<signer account id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRef {
    pub tx_hash: String,
    pub account_id: String,
}

impl TxRef {
    pub fn new(tx_hash: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            account_id: account_id.into(),
        }
    }

    /// Decodes the hash part into the 32 raw bytes NEAR expects.
    pub fn hash_bytes(&self) -> Result<[u8; 32]> {
        decode_hash(&self.tx_hash)
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.account_id)
    }
}

/// Splits a transaction reference on its first `:`.
pub fn split_tx_ref(s: &str) -> Result<TxRef> {
    let (tx_hash, account_id) = s.split_once(':').ok_or_else(|| {
        Error::InvalidArgument(format!(
            "transaction reference {s} is not <hash>:<account id>"
        ))
    })?;
    Ok(TxRef::new(tx_hash, account_id))
}

/// Decodes a prefixed 32-byte hash.
pub fn decode_hash(value: &str) -> Result<[u8; 32]> {
    let bytes = decode_hex(value)?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        Error::InvalidArgument(format!(
            "hash {value} must be 32 bytes, got {}",
            b.len()
        ))
    })
}

/// A 20-byte Ethereum address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex without the prefix, as the EVM contract expects it.
    pub fn to_raw_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HEX_PREFIX}{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parses an address, accepting any letter case.
    fn from_str(s: &str) -> Result<Self> {
        let raw = strip_prefix(s);
        if raw.len() != Self::LEN * 2 || !is_hex(raw) {
            return Err(Error::InvalidArgument(format!("invalid address {s}")));
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(raw, &mut bytes).map_err(|e| {
            Error::InvalidArgument(format!("invalid address {s}: {e}"))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed reverse lookup for a set of known accounts.
///
/// Address derivation is one-way; this table can only answer for the
/// account ids it was built from.
#[derive(Debug, Clone, Default)]
pub struct KnownAccounts {
    by_address: HashMap<Address, String>,
}

impl KnownAccounts {
    pub fn new<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let by_address = accounts
            .into_iter()
            .map(Into::into)
            .map(|id: String| (account_id_to_address(&id), id))
            .collect();
        Self { by_address }
    }

    pub fn account_id(&self, address: &Address) -> Option<&str> {
        self.by_address.get(address).map(String::as_str)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.by_address.keys()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn prefix_handling() {
        assert_eq!(strip_prefix("0x0000"), "0000");
        assert_eq!(strip_prefix("0000"), "0000");
        assert_eq!(add_prefix("0000"), "0x0000");
        for s in ["0x", "0x0000", "0xdeadbeef"] {
            assert_eq!(add_prefix(s), s);
            assert_eq!(strip_prefix(&add_prefix(s)), strip_prefix(s));
        }
    }

    #[test]
    fn non_string_params_are_rejected() {
        assert_matches!(
            expect_str(&json!(10), "value"),
            Err(Error::InvalidArgument(_))
        );
        assert_eq!(expect_str(&json!("0x00"), "value").unwrap(), "0x00");
    }

    #[test]
    fn hex_detection() {
        assert!(is_hex("0x0000"));
        assert!(is_hex(""));
        assert!(is_hex("0x"));
        assert!(!is_hex("HyvTTSooKwerRvo1bv5y16SNNCQivBtYtreHnDwdp4m9"));
    }

    #[test]
    fn account_id_policy() {
        assert!(is_valid_account_id("abcd-1234.fffff"));
        assert!(is_valid_account_id("test.near"));
        assert!(!is_valid_account_id("abcdE123"));
        assert!(!is_valid_account_id("invalid.&&id"));
        assert!(!is_valid_account_id("invalid..id"));
        assert!(!is_valid_account_id("e"));
        assert!(!is_valid_account_id(&"e".repeat(65)));
        assert!(is_valid_account_id(&"e".repeat(64)));
        assert!(!is_valid_account_id(".near"));
        assert!(!is_valid_account_id("near-"));
    }

    #[test]
    fn address_derivation_vector() {
        let address = account_id_to_address("test.near");
        assert_eq!(
            address.to_string(),
            "0xcbda96b3f2b8eb962f97ae50c3852ca976740e2b"
        );
        // Derivation normalizes case first
        assert_eq!(account_id_to_address("TEST.near"), address);
    }

    #[test]
    fn address_parsing() {
        let parsed: Address = "0xCBdA96B3F2B8eb962f97AE50C3852CA976740e2B"
            .parse()
            .unwrap();
        assert_eq!(parsed, account_id_to_address("test.near"));
        assert_matches!(
            "0x1234".parse::<Address>(),
            Err(Error::InvalidArgument(_))
        );
        assert_eq!(
            serde_json::to_value(parsed).unwrap(),
            json!("0xcbda96b3f2b8eb962f97ae50c3852ca976740e2b")
        );
    }

    #[test]
    fn base58_round_trip() {
        let encoded = "HyvTTSooKwerRvo1bv5y16SNNCQivBtYtreHnDwdp4m9";
        let hex = base58_to_hex(encoded).unwrap();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex_to_base58(&hex).unwrap(), encoded);

        let bytes = [0u8, 1, 2, 250, 255];
        let b58 = bs58::encode(bytes).into_string();
        assert_eq!(hex_to_base58(&base58_to_hex(&b58).unwrap()).unwrap(), b58);
        assert_matches!(base58_to_hex("0OIl"), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn base64_conversions() {
        assert_eq!(base64_to_hex("AAEC").unwrap(), "0x000102");
        assert_eq!(base64_to_string("aGVsbG8=").unwrap(), "hello");
        assert_matches!(base64_to_hex("%%%"), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn decimal_conversions() {
        assert_eq!(dec_to_hex("255").unwrap(), "0xff");
        assert_eq!(dec_to_hex("0").unwrap(), "0x0");
        assert_eq!(hex_to_dec("0xff").unwrap(), "255");
        let big = "1000000000000000000000000000000";
        assert_eq!(hex_to_dec(&dec_to_hex(big).unwrap()).unwrap(), big);
        assert_matches!(dec_to_hex("12a"), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn quantities() {
        assert_eq!(quantity(0u64), "0x0");
        assert_eq!(quantity(255u64), "0xff");
        assert_eq!(hex_to_u64("0x10").unwrap(), 16);
        assert_eq!(hex_to_u128("0x").unwrap(), 0);
        assert_eq!(decode_hex("0x1").unwrap(), vec![1]);
    }

    #[test]
    fn tx_ref_split() {
        let tx_ref = split_tx_ref("0x0000:accountId").unwrap();
        assert_eq!(tx_ref.tx_hash, "0x0000");
        assert_eq!(tx_ref.account_id, "accountId");
        assert_eq!(tx_ref.to_string(), "0x0000:accountId");
        assert_matches!(split_tx_ref("0x0000"), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn timestamps_truncate_to_seconds() {
        assert_eq!(convert_timestamp(1_595_350_551_591_948_000), 1_595_350_551);
        assert_eq!(convert_timestamp(999_999_999), 0);
    }

    #[test]
    fn known_accounts_only_answer_for_members() {
        let known = KnownAccounts::new(["test.near", "evm"]);
        let address = account_id_to_address("test.near");
        assert_eq!(known.account_id(&address), Some("test.near"));
        assert_eq!(known.len(), 2);
        let stranger = account_id_to_address("other.near");
        assert_eq!(known.account_id(&stranger), None);
    }
}
