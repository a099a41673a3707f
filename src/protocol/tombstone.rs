//! Tombstone is used to replace deleted objects

use activitystreams_kinds::object::TombstoneType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Placeholder for a deleted object
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    #[serde(rename = "type")]
    kind: TombstoneType,
    /// Id of the deleted object
    pub id: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Tombstone {
    /// Create a new tombstone for the given object id
    pub fn new(id: Url) -> Tombstone {
        Tombstone {
            kind: TombstoneType::Tombstone,
            id,
            published: None,
            deleted: None,
            updated: None,
        }
    }
}
