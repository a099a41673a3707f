//! Traits which connect the protocol engine to storage, transport and per-type behaviour

use crate::{
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::{activity::Activity, person::Person},
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;


/// Storage and transport collaborator which the inbox and outbox pipelines are driven by.
///
/// The library performs no I/O on its own. Everything which touches a database or the network
/// goes through this trait, which is installed once in
/// [FederationConfig](crate::config::FederationConfig).
///
/// Implementations must make the duplicate check ([Backend::inbox_get_by_iri]) followed by
/// [Backend::inbox_new] safe against concurrent delivery of the same activity id, for example
/// with a unique index on the activity id. Any activity id is inserted at most once per inbox.
///
/// Side effect methods (`new_follower`, `inbox_like`, ...) are called after the activity was
/// persisted, with the owner of the box which is processing it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve an identifier to its JSON representation, from the local database or over the
    /// network.
    async fn fetch_iri(&self, iri: &Url) -> Result<Value, Error>;

    /// Read an activity from the inbox of `owner`, returns `Ok(None)` if not found.
    async fn inbox_get_by_iri(&self, owner: &Person, iri: &Url)
        -> Result<Option<Activity>, Error>;

    /// Insert a received activity into the inbox of `owner`.
    async fn inbox_new(&self, owner: &Person, activity: &Activity) -> Result<(), Error>;

    /// Insert a published activity into the outbox of `owner`.
    async fn outbox_new(&self, owner: &Person, activity: &Activity) -> Result<(), Error>;

    /// Returns true if `owner` has blocked the actor `actor_id`.
    async fn outbox_is_blocked(&self, owner: &Person, actor_id: &Url) -> Result<bool, Error>;

    /// Returns true if `object` was published through the outbox of this instance.
    async fn is_from_outbox(&self, object: &Activity) -> Result<bool, Error>;

    /// `owner` gained a follower through `follow`.
    async fn new_follower(&self, owner: &Person, follow: &Activity) -> Result<(), Error>;
    /// `follow` was undone by the follower.
    async fn undo_new_follower(&self, owner: &Person, follow: &Activity) -> Result<(), Error>;
    /// `owner` now follows the object of `follow`.
    async fn new_following(&self, owner: &Person, follow: &Activity) -> Result<(), Error>;
    /// `owner` stopped following the object of `follow`.
    async fn undo_new_following(&self, owner: &Person, follow: &Activity) -> Result<(), Error>;

    async fn inbox_like(&self, owner: &Person, like: &Activity) -> Result<(), Error>;
    async fn inbox_undo_like(&self, owner: &Person, like: &Activity) -> Result<(), Error>;
    async fn outbox_like(&self, owner: &Person, like: &Activity) -> Result<(), Error>;
    async fn outbox_undo_like(&self, owner: &Person, like: &Activity) -> Result<(), Error>;

    async fn inbox_announce(&self, owner: &Person, announce: &Activity) -> Result<(), Error>;
    async fn inbox_undo_announce(&self, owner: &Person, announce: &Activity)
        -> Result<(), Error>;
    async fn outbox_announce(&self, owner: &Person, announce: &Activity) -> Result<(), Error>;
    async fn outbox_undo_announce(
        &self,
        owner: &Person,
        announce: &Activity,
    ) -> Result<(), Error>;

    async fn inbox_create(&self, owner: &Person, create: &Activity) -> Result<(), Error>;
    async fn outbox_create(&self, owner: &Person, create: &Activity) -> Result<(), Error>;
    async fn inbox_update(&self, owner: &Person, update: &Activity) -> Result<(), Error>;
    async fn outbox_update(&self, owner: &Person, update: &Activity) -> Result<(), Error>;
    async fn inbox_delete(&self, owner: &Person, delete: &Activity) -> Result<(), Error>;
    async fn outbox_delete(&self, owner: &Person, delete: &Activity) -> Result<(), Error>;

    /// Mint a new random object id.
    fn random_object_id(&self) -> String;

    /// Base url of this instance.
    fn base_url(&self) -> &Url;

    /// Public url of the activity with the given object id.
    fn activity_url(&self, object_id: &str) -> Result<Url, Error> {
        Ok(self.base_url().join(&format!("outbox/{object_id}"))?)
    }

    /// Deliver a serialized activity to a remote inbox, signed on behalf of `actor`.
    async fn post_to_remote_inbox(
        &self,
        actor: &Person,
        payload: &str,
        inbox: &Url,
    ) -> Result<(), Error>;
}

/// Result of an optional per-type hook.
///
/// Errors are returned through `Result`, so together with it a hook has three outcomes: it
/// doesn't apply to the type, it ran, or it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    /// The type has no behaviour for this step
    NotApplicable,
    /// The hook ran successfully
    Done,
    /// The activity should be dropped without error. Only meaningful for pre-inbox hooks.
    Drop,
}

/// Per-type rules and hooks.
///
/// There is one implementation for each supported `type`, registered in
/// [crate::registry]. Every hook defaults to [Hook::NotApplicable].
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    /// The `type` this handler is responsible for
    fn kind(&self) -> ActivityType;

    /// Whether an `actor` field is mandatory
    fn actor_required(&self) -> bool {
        true
    }

    /// Whether an `object` field is mandatory
    fn object_required(&self) -> bool {
        false
    }

    /// Types allowed for an inline or referenced `object`
    fn allowed_object_types(&self) -> &'static [ActivityType] {
        &[]
    }

    /// Type specific defaults and checks, applied to the raw fields during construction.
    fn init(&self, _fields: &mut Map<String, Value>) -> Result<(), Error> {
        Ok(())
    }

    /// Called right after the activity received its id in the outbox pipeline.
    fn on_id_assigned(&self, _activity: &mut Activity, _id: &Url) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }

    /// Raw recipient references: identifiers or inline actors.
    async fn recipients(&self, _activity: &Activity, _data: &Data) -> Result<Vec<Value>, Error> {
        Ok(vec![])
    }

    /// Checks before a received activity is persisted.
    async fn pre_inbox(
        &self,
        _activity: &Activity,
        _owner: &Person,
        _data: &Data,
    ) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }

    /// Side effects of a received activity, after it was persisted.
    async fn post_inbox(
        &self,
        _activity: &Activity,
        _owner: &Person,
        _data: &Data,
    ) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }

    /// Reverts the side effects of a received activity, when an `Undo` for it arrives.
    async fn undo_inbox(
        &self,
        _activity: &Activity,
        _owner: &Person,
        _data: &Data,
    ) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }

    /// Checks before a local activity is persisted.
    async fn pre_outbox(&self, _activity: &Activity, _data: &Data) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }

    /// Side effects of a local activity, after it was persisted and its recipients resolved.
    async fn post_outbox(
        &self,
        _activity: &Activity,
        _owner: &Person,
        _recipients: &[Url],
        _data: &Data,
    ) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }

    /// Reverts the side effects of a local activity, when it gets undone.
    async fn undo_outbox(
        &self,
        _activity: &Activity,
        _owner: &Person,
        _data: &Data,
    ) -> Result<Hook, Error> {
        Ok(Hook::NotApplicable)
    }
}
