use crate::{
    activities::{verify_from_outbox, verify_same_actor},
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::{activity::Activity, person::Person},
    traits::{ActivityHandler, Hook},
};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

#[derive(Debug)]
pub struct UpdateHandler;

#[async_trait]
impl ActivityHandler for UpdateHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Update
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Note, ActivityType::Person]
    }

    async fn recipients(&self, update: &Activity, _data: &Data) -> Result<Vec<Value>, Error> {
        Ok(update.addressing())
    }

    async fn pre_inbox(
        &self,
        update: &Activity,
        _owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        let object = update.get_object(data).await?;
        verify_same_actor(update, object)?;
        Ok(Hook::Done)
    }

    async fn post_inbox(
        &self,
        update: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_update(owner, update).await?;
        Ok(Hook::Done)
    }

    async fn pre_outbox(&self, update: &Activity, data: &Data) -> Result<Hook, Error> {
        let object = update.get_object(data).await?;
        verify_from_outbox(object, data).await?;
        Ok(Hook::Done)
    }

    async fn post_outbox(
        &self,
        update: &Activity,
        owner: &Person,
        _recipients: &[Url],
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_update(owner, update).await?;
        Ok(Hook::Done)
    }
}
