use crate::{
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::{activity::Activity, person::Person},
    traits::{ActivityHandler, Hook},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

#[derive(Debug)]
pub struct LikeHandler;

#[async_trait]
impl ActivityHandler for LikeHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Like
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Note]
    }

    /// The author of the liked note
    async fn recipients(&self, like: &Activity, data: &Data) -> Result<Vec<Value>, Error> {
        let note = like.get_object(data).await?;
        Ok(vec![json!(note.owner_id()?)])
    }

    async fn post_inbox(
        &self,
        like: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_like(owner, like).await?;
        Ok(Hook::Done)
    }

    async fn undo_inbox(
        &self,
        like: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_undo_like(owner, like).await?;
        Ok(Hook::Done)
    }

    async fn post_outbox(
        &self,
        like: &Activity,
        owner: &Person,
        _recipients: &[Url],
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_like(owner, like).await?;
        Ok(Hook::Done)
    }

    async fn undo_outbox(
        &self,
        like: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_undo_like(owner, like).await?;
        Ok(Hook::Done)
    }
}
