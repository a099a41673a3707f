use crate::{
    activities::{verify_from_outbox, verify_same_actor},
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
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct UndoHandler;

#[async_trait]
impl ActivityHandler for UndoHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Undo
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Follow, ActivityType::Like, ActivityType::Announce]
    }

    /// For a follow the followed actor, otherwise the author of the liked or shared note.
    async fn recipients(&self, undo: &Activity, data: &Data) -> Result<Vec<Value>, Error> {
        let undone = undo.get_object(data).await?;
        let recipient = if undone.kind() == ActivityType::Follow {
            undone.object().and_then(ObjectRef::id)
        } else {
            Some(undone.get_object(data).await?.owner_id()?.clone())
        };
        Ok(recipient.map(|id| json!(id)).into_iter().collect())
    }

    async fn pre_inbox(
        &self,
        undo: &Activity,
        _owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        let undone = undo.get_object(data).await?;
        verify_same_actor(undo, undone)?;
        Ok(Hook::Done)
    }

    async fn post_inbox(
        &self,
        undo: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        let undone = undo.get_object(data).await?;
        let hook = undone.handler()?.undo_inbox(undone, owner, data).await?;
        debug!("Undo inbox hook of {undone}: {hook:?}");
        Ok(hook)
    }

    async fn pre_outbox(&self, undo: &Activity, data: &Data) -> Result<Hook, Error> {
        let undone = undo.get_object(data).await?;
        verify_from_outbox(undone, data).await?;
        Ok(Hook::Done)
    }

    async fn post_outbox(
        &self,
        undo: &Activity,
        owner: &Person,
        _recipients: &[Url],
        data: &Data,
    ) -> Result<Hook, Error> {
        let undone = undo.get_object(data).await?;
        let hook = undone.handler()?.undo_outbox(undone, owner, data).await?;
        debug!("Undo outbox hook of {undone}: {hook:?}");
        Ok(hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FederationConfig, traits::tests::MemoryBackend};
    use std::sync::Arc;

    fn undo(actor: &str) -> Result<Activity, Error> {
        Activity::from_json(json!({
            "type": "Undo",
            "id": "https://remote.org/undos/1",
            "actor": actor,
            "object": {
                "type": "Follow",
                "id": "https://remote.org/follows/1",
                "actor": "https://remote.org/u/alice",
                "object": "https://example.com/u/bob"
            }
        }))
    }

    #[tokio::test]
    async fn test_only_original_actor_can_undo() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        let bob = backend.add_person("https://example.com/u/bob", None)?;
        let data = FederationConfig::builder()
            .backend(backend)
            .build()?
            .to_request_data();

        let own = undo("https://remote.org/u/alice")?;
        assert_eq!(Hook::Done, UndoHandler.pre_inbox(&own, &bob, &data).await?);

        let foreign = undo("https://remote.org/u/mallory")?;
        let res = UndoHandler.pre_inbox(&foreign, &bob, &data).await;
        assert_eq!(
            Some(Error::AuthorizationMismatch {
                actor: "https://remote.org/u/mallory".parse()?,
                object: String::new(),
            }),
            res.err()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_undo_recipient() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        let data = FederationConfig::builder()
            .backend(backend)
            .build()?
            .to_request_data();
        let recipients = UndoHandler
            .recipients(&undo("https://remote.org/u/alice")?, &data)
            .await?;
        assert_eq!(vec![json!("https://example.com/u/bob")], recipients);
        Ok(())
    }

    #[tokio::test]
    async fn test_undo_requires_local_object() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        let data = FederationConfig::builder()
            .backend(backend)
            .build()?
            .to_request_data();
        let res = UndoHandler
            .pre_outbox(&undo("https://remote.org/u/alice")?, &data)
            .await;
        assert_eq!(Some(Error::NotFromOutbox(String::new())), res.err());
        Ok(())
    }
}
