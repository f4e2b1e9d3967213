// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Serialize, Serializer};

/// Progress reported while the node catches up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    #[serde(with = "super::serde_helper::quantity")]
    pub starting_block: u64,
    #[serde(with = "super::serde_helper::quantity")]
    pub current_block: u64,
    #[serde(with = "super::serde_helper::quantity")]
    pub highest_block: u64,
}

/// Result of `eth_syncing`: `false`, or the progress object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    Syncing(SyncProgress),
}

impl Serialize for SyncStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            SyncStatus::Synced => s.serialize_bool(false),
            SyncStatus::Syncing(progress) => progress.serialize(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn synced_is_false() {
        let value = serde_json::to_value(SyncStatus::Synced).unwrap();
        assert_eq!(value, json!(false));

        let syncing = SyncStatus::Syncing(SyncProgress {
            starting_block: 1,
            current_block: 16,
            highest_block: 16,
        });
        assert_eq!(
            serde_json::to_value(syncing).unwrap(),
            json!({
                "startingBlock": "0x1",
                "currentBlock": "0x10",
                "highestBlock": "0x10",
            })
        );
    }
}
