//! Actor representation used for addressing and delivery

use crate::{error::Error, kinds::ActivityType};
use activitystreams_kinds::actor::PersonType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// An actor, as far as this library needs to know about it. All other profile fields are kept
/// in `extra`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "type")]
    kind: PersonType,
    pub id: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Endpoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<Url>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `endpoints` field of an actor
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_inbox: Option<Url>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    /// Create a minimal actor with the given inbox
    pub fn new(id: Url, inbox: Url) -> Person {
        Person {
            kind: PersonType::Person,
            id,
            inbox: Some(inbox),
            endpoints: None,
            followers: None,
            extra: Map::new(),
        }
    }

    /// Parse an actor from its JSON representation. Fails with
    /// [Error::UnexpectedActivityType] if the value is not a `Person`.
    pub fn from_json(value: Value) -> Result<Person, Error> {
        let kind = value.get("type").and_then(Value::as_str);
        if kind != Some(ActivityType::Person.as_str()) {
            return Err(Error::UnexpectedActivityType(format!(
                "expected a Person, got {}",
                kind.unwrap_or("an untyped object")
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("invalid Person: {e}")))
    }

    /// The actor's shared inbox, if any
    pub fn shared_inbox(&self) -> Option<&Url> {
        self.endpoints
            .as_ref()
            .and_then(|endpoints| endpoints.shared_inbox.as_ref())
    }

    /// Returns shared inbox if it exists, normal inbox otherwise.
    pub fn shared_inbox_or_inbox(&self) -> Option<&Url> {
        self.shared_inbox().or(self.inbox.as_ref())
    }
}
