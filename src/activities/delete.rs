use crate::{
    activities::{verify_from_outbox, verify_same_actor},
    config::Data,
    error::Error,
    fetch::fetch_iri,
    kinds::ActivityType,
    protocol::{activity::Activity, person::Person},
    registry::parse_activity,
    traits::{ActivityHandler, Hook},
};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

#[derive(Debug)]
pub struct DeleteHandler;

/// The deleted object. A tombstone is resolved to the object it replaces, as long as the backend
/// still knows it.
async fn deleted_object(delete: &Activity, data: &Data) -> Result<Activity, Error> {
    let object = delete.get_object(data).await?;
    if object.kind() != ActivityType::Tombstone {
        return Ok(object.clone());
    }
    let id = object
        .id()
        .ok_or_else(|| Error::malformed(format!("tombstone in {delete} has no id")))?;
    parse_activity(fetch_iri(id, data).await?, None)
}

#[async_trait]
impl ActivityHandler for DeleteHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Delete
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Note, ActivityType::Tombstone]
    }

    /// Everyone who received the deleted object
    async fn recipients(&self, delete: &Activity, data: &Data) -> Result<Vec<Value>, Error> {
        let object = deleted_object(delete, data).await?;
        object.handler()?.recipients(&object, data).await
    }

    async fn pre_inbox(
        &self,
        delete: &Activity,
        _owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        let object = deleted_object(delete, data).await?;
        verify_same_actor(delete, &object)?;
        Ok(Hook::Done)
    }

    async fn post_inbox(
        &self,
        delete: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_delete(owner, delete).await?;
        Ok(Hook::Done)
    }

    async fn pre_outbox(&self, delete: &Activity, data: &Data) -> Result<Hook, Error> {
        let object = deleted_object(delete, data).await?;
        verify_from_outbox(&object, data).await?;
        Ok(Hook::Done)
    }

    async fn post_outbox(
        &self,
        delete: &Activity,
        owner: &Person,
        _recipients: &[Url],
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_delete(owner, delete).await?;
        Ok(Hook::Done)
    }
}
