use crate::{
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::{
        activity::{Activity, ObjectRef},
        person::Person,
    },
    traits::{ActivityHandler, Hook},
};
use async_trait::async_trait;
use itertools::Itertools;
use serde_json::{json, Value};
use tracing::warn;
use url::Url;

#[derive(Debug)]
pub struct AnnounceHandler;

#[async_trait]
impl ActivityHandler for AnnounceHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Announce
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Note]
    }

    /// The author of the shared note, and everyone in `to` and `cc`
    async fn recipients(&self, announce: &Activity, data: &Data) -> Result<Vec<Value>, Error> {
        let note = announce.get_object(data).await?;
        let author = json!(note.owner_id()?);
        Ok(std::iter::once(author)
            .chain(announce.to().iter().cloned())
            .chain(announce.cc().iter().cloned())
            .unique()
            .collect())
    }

    /// Some servers announce legacy notices which are not referenced by an http(s) url. These
    /// can't be resolved, so they are dropped.
    async fn pre_inbox(
        &self,
        announce: &Activity,
        _owner: &Person,
        _data: &Data,
    ) -> Result<Hook, Error> {
        if let Some(ObjectRef::Id(id)) = announce.object() {
            if !id.scheme().starts_with("http") {
                warn!("Received {announce} referencing the legacy notice {id}, dropping it");
                return Ok(Hook::Drop);
            }
        }
        Ok(Hook::Done)
    }

    async fn post_inbox(
        &self,
        announce: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_announce(owner, announce).await?;
        Ok(Hook::Done)
    }

    async fn undo_inbox(
        &self,
        announce: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_undo_announce(owner, announce).await?;
        Ok(Hook::Done)
    }

    async fn post_outbox(
        &self,
        announce: &Activity,
        owner: &Person,
        _recipients: &[Url],
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_announce(owner, announce).await?;
        Ok(Hook::Done)
    }

    async fn undo_outbox(
        &self,
        announce: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_undo_announce(owner, announce).await?;
        Ok(Hook::Done)
    }
}
