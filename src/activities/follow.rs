use crate::{
    activities::{build, expect_kind},
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
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct FollowHandler;

#[async_trait]
impl ActivityHandler for FollowHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Follow
    }

    fn object_required(&self) -> bool {
        true
    }

    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[ActivityType::Person]
    }

    async fn recipients(&self, follow: &Activity, _data: &Data) -> Result<Vec<Value>, Error> {
        Ok(vec![json!(followed_id(follow)?)])
    }

    /// Accepts every follow request right away.
    async fn post_inbox(
        &self,
        follow: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        let mut accept = follow.build_accept()?;
        let report = accept.post_to_outbox(data).await?;
        info!("Accepted {follow} with {}", report.id);
        data.backend().new_follower(owner, follow).await?;
        Ok(Hook::Done)
    }

    async fn undo_inbox(
        &self,
        follow: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().undo_new_follower(owner, follow).await?;
        Ok(Hook::Done)
    }

    /// The new following is only recorded once the `Accept` arrives.
    async fn post_outbox(
        &self,
        follow: &Activity,
        _owner: &Person,
        _recipients: &[Url],
        _data: &Data,
    ) -> Result<Hook, Error> {
        debug!("Waiting for Accept of {follow}");
        Ok(Hook::Done)
    }

    async fn undo_outbox(
        &self,
        follow: &Activity,
        owner: &Person,
        data: &Data,
    ) -> Result<Hook, Error> {
        data.backend().undo_new_following(owner, follow).await?;
        Ok(Hook::Done)
    }
}

/// Id of the followed actor
fn followed_id(follow: &Activity) -> Result<Url, Error> {
    follow
        .object()
        .and_then(ObjectRef::id)
        .ok_or_else(|| Error::malformed(format!("{follow} has no object id")))
}

impl Activity {
    /// Builds the `Accept` for this follow request, sent by the followed actor.
    pub fn build_accept(&self) -> Result<Activity, Error> {
        expect_kind(self, ActivityType::Follow)?;
        build(
            ActivityType::Accept,
            json!({
                "actor": followed_id(self)?,
                "object": self.to_json(true, false)?,
            }),
        )
    }
}
