//! Closed set of `type` values understood by this library

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

pub use activitystreams_kinds::public;

/// Supported values of the `type` field. The wire names are defined by [ActivityType::as_str].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ActivityType {
    Announce,
    Block,
    Like,
    Create,
    Update,
    Person,
    OrderedCollection,
    OrderedCollectionPage,
    CollectionPage,
    Collection,
    Note,
    Accept,
    Reject,
    Follow,
    Delete,
    Undo,
    Image,
    Tombstone,
}

impl ActivityType {
    /// Every known type, in declaration order
    pub const ALL: [ActivityType; 18] = [
        ActivityType::Announce,
        ActivityType::Block,
        ActivityType::Like,
        ActivityType::Create,
        ActivityType::Update,
        ActivityType::Person,
        ActivityType::OrderedCollection,
        ActivityType::OrderedCollectionPage,
        ActivityType::CollectionPage,
        ActivityType::Collection,
        ActivityType::Note,
        ActivityType::Accept,
        ActivityType::Reject,
        ActivityType::Follow,
        ActivityType::Delete,
        ActivityType::Undo,
        ActivityType::Image,
        ActivityType::Tombstone,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Announce => "Announce",
            ActivityType::Block => "Block",
            ActivityType::Like => "Like",
            ActivityType::Create => "Create",
            ActivityType::Update => "Update",
            ActivityType::Person => "Person",
            ActivityType::OrderedCollection => "OrderedCollection",
            ActivityType::OrderedCollectionPage => "OrderedCollectionPage",
            ActivityType::CollectionPage => "CollectionPage",
            ActivityType::Collection => "Collection",
            ActivityType::Note => "Note",
            ActivityType::Accept => "Accept",
            ActivityType::Reject => "Reject",
            ActivityType::Follow => "Follow",
            ActivityType::Delete => "Delete",
            ActivityType::Undo => "Undo",
            ActivityType::Image => "Image",
            ActivityType::Tombstone => "Tombstone",
        }
    }

    /// True for the types which can be expanded into a list of members
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            ActivityType::Collection | ActivityType::OrderedCollection
        )
    }
}

impl From<ActivityType> for &'static str {
    fn from(kind: ActivityType) -> Self {
        kind.as_str()
    }
}

impl TryFrom<String> for ActivityType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for ActivityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::malformed(format!("unknown activity type {s}")))
    }
}
