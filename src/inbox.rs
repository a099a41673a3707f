//! Processing of activities received in the inbox of a local actor

use crate::{
    config::Data,
    error::Error,
    protocol::{activity::Activity, person::Person},
    traits::Hook,
};
use std::fmt::{Display, Formatter};
use tracing::{debug, info};

/// Result of processing a received activity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboxOutcome {
    /// The activity was stored and its side effects applied
    Processed,
    /// The activity was ignored. This is not an error, there is nothing to retry.
    Dropped(DropReason),
}

/// Why a received activity was dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The owner of the inbox blocked the sender
    Blocked,
    /// The activity is already in the inbox
    Duplicate,
    /// The activity can't be processed, for example because it references a legacy object
    Ignored,
}

impl Display for DropReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DropReason::Blocked => "actor is blocked",
            DropReason::Duplicate => "duplicate activity",
            DropReason::Ignored => "activity ignored",
        };
        f.write_str(reason)
    }
}

impl Activity {
    /// Process an activity which was posted to the inbox of `owner`.
    ///
    /// Activities from actors blocked by the owner, and activities which are already in the inbox,
    /// are dropped without error. Otherwise the type specific checks run, the activity is stored
    /// with [Backend::inbox_new](crate::traits::Backend::inbox_new) and its side effects are
    /// applied. Errors of checks or side effects are returned to the caller. Each call starts
    /// with a fresh fetch counter.
    pub async fn process_from_inbox(
        &self,
        owner: &Person,
        data: &Data,
    ) -> Result<InboxOutcome, Error> {
        let data = &data.reset_request_count();
        let handler = self.handler()?;
        let id = self
            .id()
            .ok_or_else(|| Error::malformed(format!("received {self} without id")))?;
        debug!("Processing {} {id} in inbox of {}", self.kind(), owner.id);

        let actor = self.get_actor(data).await?;
        let backend = data.backend();
        if backend.outbox_is_blocked(owner, &actor.id).await? {
            info!("{} is blocked, dropping {id}", actor.id);
            return Ok(InboxOutcome::Dropped(DropReason::Blocked));
        }
        if backend.inbox_get_by_iri(owner, id).await?.is_some() {
            info!("Received duplicate activity {id}, dropping it");
            return Ok(InboxOutcome::Dropped(DropReason::Duplicate));
        }

        match handler.pre_inbox(self, owner, data).await? {
            Hook::Drop => {
                info!("Dropping {id} after pre inbox hook");
                return Ok(InboxOutcome::Dropped(DropReason::Ignored));
            }
            Hook::NotApplicable => debug!("Pre inbox hook not applicable for {}", self.kind()),
            Hook::Done => debug!("Called pre inbox hook for {id}"),
        }

        backend.inbox_new(owner, self).await?;
        info!("Activity {id} saved in inbox of {}", owner.id);

        match handler.post_inbox(self, owner, data).await? {
            Hook::NotApplicable => debug!("Post inbox hook not applicable for {}", self.kind()),
            _ => debug!("Called post inbox hook for {id}"),
        }
        Ok(InboxOutcome::Processed)
    }
}

/// Inbox of a local actor
#[derive(Clone, Debug)]
pub struct Inbox {
    owner: Person,
}

impl Inbox {
    pub fn new(owner: Person) -> Self {
        Inbox { owner }
    }

    pub fn owner(&self) -> &Person {
        &self.owner
    }

    /// Process an activity delivered to this inbox, see [Activity::process_from_inbox].
    pub async fn post(&self, activity: &Activity, data: &Data) -> Result<InboxOutcome, Error> {
        activity.process_from_inbox(&self.owner, data).await
    }
}
