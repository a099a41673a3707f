//! Types which are only stored or referenced, without any side effects of their own

use crate::{error::Error, kinds::ActivityType, traits::ActivityHandler};
use async_trait::async_trait;
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct PersonHandler;

#[async_trait]
impl ActivityHandler for PersonHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Person
    }

    fn actor_required(&self) -> bool {
        false
    }
}

/// Blocks are never sent out, so the object must be a bare actor id.
#[derive(Debug)]
pub struct BlockHandler;

#[async_trait]
impl ActivityHandler for BlockHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Block
    }

    fn object_required(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct CollectionHandler;

#[async_trait]
impl ActivityHandler for CollectionHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Collection
    }

    fn actor_required(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct ImageHandler;

#[async_trait]
impl ActivityHandler for ImageHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Image
    }

    fn actor_required(&self) -> bool {
        false
    }

    fn init(&self, fields: &mut Map<String, Value>) -> Result<(), Error> {
        if !fields.contains_key("url") {
            return Err(Error::malformed("Image is missing its url"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TombstoneHandler;

#[async_trait]
impl ActivityHandler for TombstoneHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Tombstone
    }

    fn actor_required(&self) -> bool {
        false
    }
}
