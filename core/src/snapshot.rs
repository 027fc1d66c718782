//! Backup snapshots: every collection to and from one JSON document.
//!
//! Two layouts are understood:
//!   - the native snapshot (`WorkspaceSnapshot` as JSON), and
//!   - the legacy browser key-value layout, one JSON array per
//!     `logitrak_*` key.

use crate::{
    error::TrackResult,
    model::{
        ArticleMaster, ConditioningRecord, MasterOrder, Operator, PickingRecord, ReceptionRecord,
        RecordSet, StorageRecord,
    },
    store::Collection,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub operators: Vec<Operator>,
    #[serde(default)]
    pub picking: Vec<PickingRecord>,
    #[serde(default)]
    pub reception: Vec<ReceptionRecord>,
    #[serde(default)]
    pub conditioning: Vec<ConditioningRecord>,
    #[serde(default)]
    pub storage: Vec<StorageRecord>,
    #[serde(default)]
    pub master_orders: Vec<MasterOrder>,
    #[serde(default)]
    pub articles: Vec<ArticleMaster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl WorkspaceSnapshot {
    pub fn to_json(&self) -> TrackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> TrackResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Stamp the snapshot with the time it was taken for sync.
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.last_sync = Some(at);
        self
    }

    /// Read the legacy key-value layout.
    ///
    /// Each key is parsed on its own; a malformed or missing key yields an
    /// empty collection and a warning, never an error.
    pub fn from_key_value(entries: &HashMap<String, Value>) -> Self {
        Self {
            operators: legacy_collection(entries, Collection::Operators),
            picking: legacy_collection(entries, Collection::Picking),
            reception: legacy_collection(entries, Collection::Reception),
            conditioning: legacy_collection(entries, Collection::Conditioning),
            storage: legacy_collection(entries, Collection::Storage),
            master_orders: legacy_collection(entries, Collection::MasterOrders),
            articles: legacy_collection(entries, Collection::Articles),
            last_sync: None,
        }
    }

    /// Parse either layout: a JSON object with any `logitrak_*` key is
    /// treated as the legacy layout.
    pub fn parse_any(raw: &str) -> TrackResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let is_legacy = value
            .as_object()
            .map(|obj| Collection::ALL.iter().any(|c| obj.contains_key(c.legacy_key())))
            .unwrap_or(false);
        if is_legacy {
            let entries: HashMap<String, Value> = serde_json::from_value(value)?;
            Ok(Self::from_key_value(&entries))
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    pub fn records(&self) -> RecordSet {
        RecordSet {
            picking: self.picking.clone(),
            reception: self.reception.clone(),
            conditioning: self.conditioning.clone(),
            storage: self.storage.clone(),
        }
    }
}

fn legacy_collection<T: DeserializeOwned>(
    entries: &HashMap<String, Value>,
    collection: Collection,
) -> Vec<T> {
    let key = collection.legacy_key();
    let Some(raw) = entries.get(key) else {
        return Vec::new();
    };
    // The browser store kept each value as a JSON string.
    let parsed = match raw {
        Value::String(s) => serde_json::from_str::<Vec<T>>(s),
        other => serde_json::from_value::<Vec<T>>(other.clone()),
    };
    parsed.unwrap_or_else(|e| {
        log::warn!("snapshot: ignoring malformed legacy key {key}: {e}");
        Vec::new()
    })
}
