//! One handler per supported `type`, with the validation rules, hooks and builders of that type.

use crate::{
    config::Data,
    error::Error,
    kinds::ActivityType,
    protocol::activity::Activity,
    registry::parse_activity,
};
use chrono::Utc;
use serde_json::Value;

pub mod accept;
pub mod announce;
pub mod create;
pub mod delete;
pub mod follow;
pub mod like;
pub mod note;
pub mod objects;
pub mod undo;
pub mod update;

/// Current time in UTC, second precision with `Z` suffix
pub(crate) fn now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Fails with [Error::UnexpectedActivityType] unless `activity` has the given type.
pub(crate) fn expect_kind(activity: &Activity, kind: ActivityType) -> Result<(), Error> {
    if activity.kind() != kind {
        return Err(Error::UnexpectedActivityType(format!(
            "expected a {kind}, got {activity} of type {}",
            activity.kind()
        )));
    }
    Ok(())
}

/// Builds a new activity of the given type and validates it.
pub(crate) fn build(kind: ActivityType, fields: Value) -> Result<Activity, Error> {
    let Value::Object(mut fields) = fields else {
        return Err(Error::malformed("activity must be a JSON object"));
    };
    fields.insert("type".to_string(), Value::from(kind.as_str()));
    parse_activity(Value::Object(fields), Some(kind))
}

/// Ensures that the actor of `activity` is also the actor of the object it acts on.
pub(crate) fn verify_same_actor(activity: &Activity, object: &Activity) -> Result<(), Error> {
    let actor = activity.owner_id()?;
    if actor != object.owner_id()? {
        return Err(Error::AuthorizationMismatch {
            actor: actor.clone(),
            object: object.to_string(),
        });
    }
    Ok(())
}

/// Ensures that the object was published from the outbox of this instance.
pub(crate) async fn verify_from_outbox(object: &Activity, data: &Data) -> Result<(), Error> {
    if !data.backend().is_from_outbox(object).await? {
        return Err(Error::NotFromOutbox(object.to_string()));
    }
    Ok(())
}

impl Activity {
    /// Builds an `Undo` of this activity, sent by the same actor.
    ///
    /// Supported for `Follow`, `Like` and `Announce`. A `Like` is embedded with only the id of
    /// the liked object.
    pub fn build_undo(&self) -> Result<Activity, Error> {
        let object = match self.kind() {
            ActivityType::Follow | ActivityType::Announce => self.to_json(true, false)?,
            ActivityType::Like => self.to_json(true, true)?,
            kind => {
                return Err(Error::UnexpectedActivityType(format!(
                    "a {kind} cannot be undone"
                )))
            }
        };
        build(
            ActivityType::Undo,
            serde_json::json!({
                "actor": self.owner_id()?,
                "object": object,
            }),
        )
    }
}
