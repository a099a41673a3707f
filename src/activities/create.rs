use crate::{
    activities::now,
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
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct CreateHandler;

#[async_trait]
impl ActivityHandler for CreateHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Create
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Note]
    }

    /// The created object is attributed to the actor, and published at the same time as the
    /// activity.
    fn init(&self, fields: &mut Map<String, Value>) -> Result<(), Error> {
        let actor = fields.get("actor").cloned();
        let published = fields.get("published").cloned();
        let Some(Value::Object(object)) = fields.get_mut("object") else {
            return Ok(());
        };
        if let Some(actor) = actor {
            object.entry("attributedTo").or_insert(actor);
        }
        if !object.contains_key("published") {
            let published = match published {
                Some(published) => published,
                None => {
                    let now = Value::from(now());
                    fields.insert("published".to_string(), now.clone());
                    now
                }
            };
            if let Some(Value::Object(object)) = fields.get_mut("object") {
                object.insert("published".to_string(), published);
            }
        }
        Ok(())
    }

    /// The wrapped object gets the id of the activity with `/activity` appended.
    fn on_id_assigned(&self, create: &mut Activity, id: &Url) -> Result<Hook, Error> {
        let Some(ObjectRef::Object(object)) = &mut create.object else {
            return Ok(Hook::NotApplicable);
        };
        let object_id = format!("{id}/activity");
        debug!("Setting id {object_id} on object of {id}");
        object.insert("id".to_string(), Value::from(object_id));
        create.reset_object_cache();
        Ok(Hook::Done)
    }

    async fn recipients(&self, create: &Activity, data: &Data) -> Result<Vec<Value>, Error> {
        let object = create.get_object(data).await?;
        let mut recipients = create.addressing();
        recipients.extend(object.handler()?.recipients(object, data).await?);
        Ok(recipients)
    }

    async fn post_inbox(
        &self,
        create: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().inbox_create(owner, create).await?;
        Ok(Hook::Done)
    }

    async fn post_outbox(
        &self,
        create: &Activity,
        owner: &Person,
        _recipients: &[Url],
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().outbox_create(owner, create).await?;
        Ok(Hook::Done)
    }
}
