use crate::{
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::{activity::Activity, person::Person},
    traits::{ActivityHandler, Hook},
};
use async_trait::async_trait;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct AcceptHandler;

#[async_trait]
impl ActivityHandler for AcceptHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Accept
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Follow]
    }

    async fn recipients(&self, accept: &Activity, data: &Data) -> Result<Vec<Value>, Error> {
        let follow = accept.get_object(data).await?;
        Ok(vec![json!(follow.owner_id()?)])
    }

    async fn post_inbox(
        &self,
        accept: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        let follow = accept.get_object(data).await?;
        data.backend().new_following(owner, follow).await?;
        Ok(Hook::Done)
    }
}
