//! Maps the wire `type` to the handler which validates and processes it.
//!
//! The registry is built once, on first use, from the fixed set of handlers in
//! [crate::activities].
//!
//! ```
//! # use activitypub_boxes::{kinds::ActivityType, registry::parse_activity};
//! # use serde_json::json;
//! let follow = parse_activity(
//!     json!({
//!         "type": "Follow",
//!         "id": "https://remote.org/activities/1",
//!         "actor": "https://remote.org/u/alice",
//!         "object": "https://example.com/u/bob"
//!     }),
//!     Some(ActivityType::Follow),
//! )?;
//! assert_eq!(ActivityType::Follow, follow.kind());
//!
//! let mismatch = parse_activity(json!({"type": "Tombstone"}), Some(ActivityType::Note));
//! assert!(mismatch.is_err());
//! # Ok::<(), activitypub_boxes::error::Error>(())
//! ```

use crate::{
    activities::{
        accept::AcceptHandler,
        announce::AnnounceHandler,
        create::CreateHandler,
        delete::DeleteHandler,
        follow::FollowHandler,
        like::LikeHandler,
        note::NoteHandler,
        objects::{
            BlockHandler,
            CollectionHandler,
            ImageHandler,
            PersonHandler,
            TombstoneHandler,
        },
        undo::UndoHandler,
        update::UpdateHandler,
    },
    error::Error,
    kinds::ActivityType,
    protocol::{activity::Activity, context::normalize_context},
    traits::ActivityHandler,
};
use itertools::Itertools;
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::LazyLock};
use tracing::debug;
use url::Url;

static REGISTRY: LazyLock<HashMap<ActivityType, &'static dyn ActivityHandler>> =
    LazyLock::new(|| {
        let handlers: [&'static dyn ActivityHandler; 14] = [
            &PersonHandler,
            &BlockHandler,
            &CollectionHandler,
            &ImageHandler,
            &TombstoneHandler,
            &NoteHandler,
            &FollowHandler,
            &AcceptHandler,
            &UndoHandler,
            &LikeHandler,
            &AnnounceHandler,
            &DeleteHandler,
            &UpdateHandler,
            &CreateHandler,
        ];
        handlers.into_iter().map(|h| (h.kind(), h)).collect()
    });

/// Returns the handler for `kind`, or `None` if the type is known but not supported.
pub fn handler(kind: ActivityType) -> Option<&'static dyn ActivityHandler> {
    REGISTRY.get(&kind).copied()
}

/// Parse and validate an activity.
///
/// Fails with [Error::UnexpectedActivityType] if `expected` is given and doesn't match, and with
/// [Error::MalformedActivity] for unknown or unsupported types and for any structural problem.
pub fn parse_activity(payload: Value, expected: Option<ActivityType>) -> Result<Activity, Error> {
    let Value::Object(mut fields) = payload else {
        return Err(Error::malformed("activity must be a JSON object"));
    };
    let type_name = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed("missing type"))?;
    let kind: ActivityType = type_name.parse()?;

    if let Some(expected) = expected {
        if expected != kind {
            return Err(Error::UnexpectedActivityType(format!(
                "expected a {expected} activity, got a {kind}"
            )));
        }
    }
    let handler =
        handler(kind).ok_or_else(|| Error::malformed(format!("unsupported activity type {kind}")))?;
    debug!("initializing a {kind} activity");

    fields.retain(|_, value| !value.is_null());
    validate_actor(handler, &mut fields)?;
    validate_object(handler, &fields)?;

    let context = fields.remove("@context");
    fields.insert(
        "@context".to_string(),
        Value::Array(normalize_context(context)),
    );

    handler.init(&mut fields)?;

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| Error::malformed(format!("invalid {kind}: {e}")))
}

fn validate_actor(
    handler: &dyn ActivityHandler,
    fields: &mut Map<String, Value>,
) -> Result<(), Error> {
    let kind = handler.kind();
    if let Some(actor) = fields.get("actor") {
        let id = actor_id(actor)?;
        fields.insert("actor".to_string(), Value::from(id.as_str()));
    } else if kind != ActivityType::Person && handler.actor_required() {
        if kind != ActivityType::Note {
            return Err(Error::malformed("missing actor"));
        }
        if !fields.contains_key("attributedTo") {
            return Err(Error::malformed("Note is missing attributedTo"));
        }
    }
    if let Some(attributed_to) = fields.get("attributedTo") {
        let author = actor_id(attributed_to)?;
        fields.insert("attributedTo".to_string(), Value::from(author.as_str()));
    }
    Ok(())
}

/// Normalizes an inline actor or a bare identifier to the identifier.
fn actor_id(actor: &Value) -> Result<Url, Error> {
    let id = match actor {
        Value::String(id) => id.as_str(),
        Value::Object(object) if object.get("type") == Some(&Value::from("Person")) => object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed(format!("missing actor id: {actor}")))?,
        _ => return Err(Error::malformed(format!("invalid actor field: {actor}"))),
    };
    Url::parse(id).map_err(|e| Error::malformed(format!("invalid actor id {id}: {e}")))
}

fn validate_object(
    handler: &dyn ActivityHandler,
    fields: &Map<String, Value>,
) -> Result<(), Error> {
    let kind = handler.kind();
    if !handler.object_required() {
        return Ok(());
    }
    match fields.get("object") {
        None => Err(Error::malformed(format!("{kind} is missing its object"))),
        Some(Value::String(_)) => Ok(()),
        Some(Value::Object(object)) => {
            let allowed = handler.allowed_object_types();
            if allowed.is_empty() {
                return Err(Error::UnexpectedActivityType(format!(
                    "unexpected inline object in {kind}"
                )));
            }
            let object_kind = object.get("type").and_then(Value::as_str);
            let has_id = object.contains_key("id");
            let Some(object_kind) = object_kind.filter(|_| has_id || kind == ActivityType::Create)
            else {
                return Err(Error::malformed("invalid object, missing type or id"));
            };
            let object_kind: ActivityType = object_kind.parse()?;
            if !allowed.contains(&object_kind) {
                return Err(Error::UnexpectedActivityType(format!(
                    "unexpected object type {object_kind} in {kind} (allowed: {})",
                    allowed.iter().join(", ")
                )));
            }
            Ok(())
        }
        Some(other) => Err(Error::malformed(format!("invalid object field: {other}"))),
    }
}
