//! Publishing activities from the outbox of a local actor

use crate::{
    activity_sending::{deliver, Delivery},
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::{
        activity::{Activity, ObjectRef},
        person::Person,
    },
    recipients::resolve_recipients,
    traits::Hook,
};
use tracing::{debug, info};
use url::Url;

/// What happened when an activity was posted to an outbox
#[derive(Debug)]
pub struct OutboxReport {
    /// Id which was assigned to the activity
    pub id: Url,
    /// Id of the object, for example the note wrapped by a `Create`
    pub object_id: Option<Url>,
    /// Inboxes the activity was sent to
    pub recipients: Vec<Url>,
    /// Result of each delivery, in the order in which they completed
    pub deliveries: Vec<Delivery>,
}

impl OutboxReport {
    /// Deliveries which failed
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| !d.is_success())
    }
}

impl Activity {
    /// Publish a new activity on behalf of its actor.
    ///
    /// Assigns a new id, runs the type specific checks, stores the activity with
    /// [Backend::outbox_new](crate::traits::Backend::outbox_new), resolves the recipients, applies
    /// the side effects and finally delivers it to every recipient inbox. Delivery failures are
    /// part of the returned report, they don't make the call fail. Each call starts with a fresh
    /// fetch counter.
    pub async fn post_to_outbox(&mut self, data: &Data) -> Result<OutboxReport, Error> {
        let data = &data.reset_request_count();
        let handler = self.handler()?;
        let backend = data.backend();

        let object_id = backend.random_object_id();
        let id = backend.activity_url(&object_id)?;
        self.assign_id(id.clone())?;
        if handler.on_id_assigned(self, &id)? == Hook::Done {
            debug!("Called id assigned hook for {id}");
        }

        match handler.pre_outbox(self, data).await? {
            Hook::NotApplicable => debug!("Pre outbox hook not applicable for {}", self.kind()),
            _ => debug!("Called pre outbox hook for {id}"),
        }

        let actor = self.get_actor(data).await?;
        backend.outbox_new(&actor, self).await?;
        info!("Activity {id} saved in outbox of {}", actor.id);

        let recipients = resolve_recipients(self, data).await?;
        let payload = serde_json::to_string(&self.to_wire()?)?;

        match handler.post_outbox(self, &actor, &recipients, data).await? {
            Hook::NotApplicable => debug!("Post outbox hook not applicable for {}", self.kind()),
            _ => debug!("Called post outbox hook for {id}"),
        }

        let deliveries = deliver(&actor, &payload, &recipients, data).await;
        Ok(OutboxReport {
            id,
            object_id: self.object().and_then(ObjectRef::id),
            recipients,
            deliveries,
        })
    }
}

/// Outbox of a local actor
#[derive(Clone, Debug)]
pub struct Outbox {
    owner: Person,
}

impl Outbox {
    pub fn new(owner: Person) -> Self {
        Outbox { owner }
    }

    pub fn owner(&self) -> &Person {
        &self.owner
    }

    /// Publish an activity of the owner of this outbox.
    ///
    /// Fails with [Error::ActorMismatch] if the activity belongs to someone else. A bare `Note`
    /// is wrapped in a `Create`, and gets the id which was assigned to it. A `Note` which already
    /// has an id was published before, and fails with [Error::IdAlreadyAssigned] without being
    /// stored or sent.
    pub async fn post(&self, activity: &mut Activity, data: &Data) -> Result<OutboxReport, Error> {
        let actor = activity.owner_id()?;
        if actor != &self.owner.id {
            return Err(Error::ActorMismatch {
                actor: actor.clone(),
                owner: self.owner.id.clone(),
            });
        }

        if activity.kind() != ActivityType::Note {
            return activity.post_to_outbox(data).await;
        }
        if let Some(id) = activity.id() {
            return Err(Error::IdAlreadyAssigned(id.clone()));
        }
        let mut create = activity.build_create()?;
        let report = create.post_to_outbox(data).await?;
        if let Some(object_id) = &report.object_id {
            activity.assign_id(object_id.clone())?;
        }
        Ok(report)
    }
}
