// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Serde helper functions for Ethereum JSON encodings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

fn parse_quantity<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let raw = s
        .strip_prefix("0x")
        .ok_or_else(|| D::Error::custom(format!("{s} is not a quantity")))?;
    u128::from_str_radix(raw, 16).map_err(D::Error::custom)
}

/// Serialize u64 as an Ethereum hex quantity.
///
/// Ethereum encodes numbers as `0x`-prefixed hex without leading zeros.
///
/// # Usage
/// ```ignore
/// #[serde(with = "near_web3_provider::model::serde_helper::quantity")]
/// ```
///
/// # Example
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "near_web3_provider::model::serde_helper::quantity")]
///     pub value: u64,
/// }
///
/// let example = Example { value: 255 };
/// let json = serde_json::to_string(&example).unwrap();
/// assert_eq!(json, r#"{"value":"0xff"}"#);
///
/// let deserialized: Example = serde_json::from_str(&json).unwrap();
/// assert_eq!(deserialized.value, 255);
/// ```
pub mod quantity {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(num: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{num:x}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let n = super::parse_quantity(deserializer)?;
        u64::try_from(n).map_err(D::Error::custom)
    }
}

/// Like [`quantity`], for `u128` amounts such as balances.
pub mod big_quantity {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(num: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{num:x}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::parse_quantity(deserializer)
    }
}

/// Like [`quantity`], with `None` encoded as `null`.
pub mod opt_quantity {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        num: &Option<u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match num {
            Some(n) => super::quantity::serialize(n, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| {
            let raw = s.strip_prefix("0x").unwrap_or(&s);
            u64::from_str_radix(raw, 16).map_err(D::Error::custom)
        })
        .transpose()
    }
}

/// Serialize a 32-byte hash as `0x`-prefixed hex.
pub mod hash {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        hash: &[u8; 32],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(hash)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(&s), &mut out)
            .map_err(D::Error::custom)?;
        Ok(out)
    }
}
