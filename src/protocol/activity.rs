//! Generic activity model shared by every supported type.
//!
//! The per-type rules live in [crate::activities], this struct only carries the fields. Values
//! are created with [crate::registry::parse_activity], which validates them.

use crate::{
    config::Data,
    error::Error,
    fetch::fetch_iri,
    kinds::ActivityType,
    protocol::{helpers::deserialize_one_or_many, person::Person},
    registry::{handler, parse_activity},
    traits::ActivityHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

/// Addressing fields which are never shown to anyone but the sender
const HIDDEN_FIELDS: [&str; 2] = ["bto", "bcc"];

/// The `object` field: either a bare identifier or an inline object.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ObjectRef {
    Id(Url),
    Object(Map<String, Value>),
}

impl ObjectRef {
    /// Identifier of the referenced object, if it has one
    pub fn id(&self) -> Option<Url> {
        match self {
            ObjectRef::Id(id) => Some(id.clone()),
            ObjectRef::Object(object) => object
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| Url::parse(id).ok()),
        }
    }

    /// `type` of an inline object
    pub fn kind(&self) -> Option<&str> {
        match self {
            ObjectRef::Id(_) => None,
            ObjectRef::Object(object) => object.get("type").and_then(Value::as_str),
        }
    }
}

/// A typed, addressed activity or object.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(
        rename = "@context",
        default,
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) context: Vec<Value>,
    #[serde(rename = "type")]
    pub(crate) kind: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) actor: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) attributed_to: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) object: Option<ObjectRef>,
    #[serde(
        default,
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) to: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) cc: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) bto: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) bcc: Vec<Value>,
    /// All other fields, preserved verbatim
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
    #[serde(skip)]
    object_cache: OnceCell<Box<Activity>>,
}

impl Activity {
    /// Parse and validate an activity of any registered type
    pub fn from_json(value: Value) -> Result<Activity, Error> {
        parse_activity(value, None)
    }

    pub fn kind(&self) -> ActivityType {
        self.kind
    }

    /// Id of the activity, absent until it is posted to an outbox
    pub fn id(&self) -> Option<&Url> {
        self.id.as_ref()
    }

    pub fn actor(&self) -> Option<&Url> {
        self.actor.as_ref()
    }

    pub fn attributed_to(&self) -> Option<&Url> {
        self.attributed_to.as_ref()
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    pub fn context(&self) -> &[Value] {
        &self.context
    }

    pub fn to(&self) -> &[Value] {
        &self.to
    }

    pub fn cc(&self) -> &[Value] {
        &self.cc
    }

    pub fn bto(&self) -> &[Value] {
        &self.bto
    }

    pub fn bcc(&self) -> &[Value] {
        &self.bcc
    }

    /// Any field which has no dedicated accessor
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Contents of `to`, `cc`, `bto` and `bcc`, in this order
    pub fn addressing(&self) -> Vec<Value> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bto)
            .chain(&self.bcc)
            .cloned()
            .collect()
    }

    pub(crate) fn handler(&self) -> Result<&'static dyn ActivityHandler, Error> {
        handler(self.kind)
            .ok_or_else(|| Error::malformed(format!("unsupported activity type {}", self.kind)))
    }

    /// The actor responsible for this activity. A `Note` falls back to `attributedTo`, and a
    /// `Person` is its own owner.
    pub fn owner_id(&self) -> Result<&Url, Error> {
        let owner = match self.kind {
            ActivityType::Person => self.id.as_ref(),
            ActivityType::Note => self.actor.as_ref().or(self.attributed_to.as_ref()),
            _ => self.actor.as_ref(),
        };
        owner.ok_or_else(|| Error::malformed(format!("{self} has no actor")))
    }

    /// Sets the id of a new activity. Ids are write-once: if the activity already has one, it is
    /// kept and [Error::IdAlreadyAssigned] is returned.
    pub fn assign_id(&mut self, id: Url) -> Result<(), Error> {
        if let Some(existing) = &self.id {
            return Err(Error::IdAlreadyAssigned(existing.clone()));
        }
        debug!("setting id {id} on new {} activity", self.kind);
        self.id = Some(id);
        Ok(())
    }

    /// Drops the cached result of [Activity::get_object]
    pub fn reset_object_cache(&mut self) {
        self.object_cache = OnceCell::new();
    }

    /// Returns the `object` as a parsed activity, resolving it through the backend if it is a
    /// bare identifier. The result is cached.
    pub async fn get_object(&self, data: &Data) -> Result<&Activity, Error> {
        let object = self
            .object_cache
            .get_or_try_init(|| async {
                let parsed = match &self.object {
                    None => return Err(Error::malformed(format!("{self} has no object"))),
                    Some(ObjectRef::Object(object)) => {
                        parse_activity(Value::Object(object.clone()), None)?
                    }
                    Some(ObjectRef::Id(id)) => {
                        let value = fetch_iri(id, data).await?;
                        let kind = value
                            .get("type")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .parse::<ActivityType>()?;
                        let allowed = self.handler()?.allowed_object_types();
                        if !allowed.contains(&kind) {
                            return Err(Error::UnexpectedActivityType(format!(
                                "invalid object type {kind} for {}",
                                self.kind
                            )));
                        }
                        parse_activity(value, None)?
                    }
                };
                Ok::<_, Error>(Box::new(parsed))
            })
            .await?;
        Ok(object.as_ref())
    }

    /// Resolves the actor (see [Activity::owner_id]) through the backend.
    pub async fn get_actor(&self, data: &Data) -> Result<Person, Error> {
        let actor_id = self.owner_id()?;
        Person::from_json(fetch_iri(actor_id, data).await?)
    }

    /// Serializes the activity to JSON.
    ///
    /// With `embed`, the `@context` and `signature` fields are left out, for nesting the
    /// activity into another one. With `object_id_only`, an inline object is replaced by its
    /// id.
    pub fn to_json(&self, embed: bool, object_id_only: bool) -> Result<Value, Error> {
        let mut json = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut json {
            if embed {
                fields.remove("@context");
                fields.remove("signature");
            }
            if object_id_only {
                let object_id = match fields.get("object") {
                    Some(Value::Object(object)) => Some(object.get("id").cloned().ok_or_else(
                        || Error::malformed(format!("embedded object of {self} should have an id")),
                    )?),
                    _ => None,
                };
                if let Some(object_id) = object_id {
                    fields.insert("object".to_string(), object_id);
                }
            }
        }
        Ok(json)
    }

    /// Serializes the activity for delivery, without the hidden recipients `bto` and `bcc`.
    /// They are also removed from the object wrapped by a `Create`.
    pub fn to_wire(&self) -> Result<Value, Error> {
        let mut json = self.to_json(false, false)?;
        if let Value::Object(fields) = &mut json {
            for field in HIDDEN_FIELDS {
                fields.remove(field);
            }
            if self.kind == ActivityType::Create {
                if let Some(Value::Object(object)) = fields.get_mut("object") {
                    for field in HIDDEN_FIELDS {
                        object.remove(field);
                    }
                }
            }
        }
        Ok(json)
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "[new {} activity]", self.kind),
        }
    }
}
