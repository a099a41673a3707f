//! Turns the addressing of an activity into the list of inboxes it is delivered to.

use crate::{
    config::Data,
    error::Error,
    fetch::{collection::collection_items, fetch_iri},
    kinds::{public, ActivityType},
    protocol::{activity::Activity, helpers::id_of, person::Person},
};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

/// Compact forms of the public collection which some servers use
const PUBLIC_ALIASES: [&str; 2] = ["as:Public", "Public"];

fn is_public(id: &str) -> bool {
    id == public().as_str() || PUBLIC_ALIASES.contains(&id)
}

/// Collects inboxes in order of first appearance, without duplicates.
struct Inboxes {
    actor_id: Url,
    inboxes: Vec<Url>,
}

impl Inboxes {
    /// Whether a reference should be skipped before resolving it
    fn skip(&self, id: &str) -> bool {
        is_public(id) || id == self.actor_id.as_str()
    }

    /// Adds the shared inbox of the person, or its personal inbox if it has none.
    fn push(&mut self, person: &Person) {
        if person.id == self.actor_id {
            return;
        }
        match person.shared_inbox_or_inbox() {
            Some(inbox) if !self.inboxes.contains(inbox) => self.inboxes.push(inbox.clone()),
            Some(_) => {}
            None => warn!("{} has no inbox, skipping it", person.id),
        }
    }
}

/// Resolves the recipients of an activity to deliverable inboxes.
///
/// The references are gathered per type (see
/// [ActivityHandler::recipients](crate::traits::ActivityHandler::recipients)). The actor of the
/// activity, the public collection and null values are skipped. Other references are resolved
/// through the backend unless they are an inline `Person`. People contribute their shared inbox,
/// falling back to their inbox. Collections are expanded into their members, which must be
/// people. Any other type fails with [Error::MalformedActivity].
pub async fn resolve_recipients(activity: &Activity, data: &Data) -> Result<Vec<Url>, Error> {
    let mut inboxes = Inboxes {
        actor_id: activity.owner_id()?.clone(),
        inboxes: vec![],
    };
    let references = activity.handler()?.recipients(activity, data).await?;

    for reference in references {
        let Some(id) = id_of(&reference) else {
            continue;
        };
        if inboxes.skip(id) {
            continue;
        }
        if reference.get("type") == Some(&Value::from(ActivityType::Person.as_str())) {
            inboxes.push(&Person::from_json(reference.clone())?);
            continue;
        }

        let id = Url::parse(id)?;
        let resolved = fetch_iri(&id, data).await?;
        let kind = resolved
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match kind.parse::<ActivityType>() {
            Ok(ActivityType::Person) => inboxes.push(&Person::from_json(resolved)?),
            Ok(collection) if collection.is_collection() => {
                for member in collection_items(&resolved, data).await? {
                    if inboxes.skip(member.as_str()) {
                        continue;
                    }
                    match fetch_iri(&member, data).await.and_then(Person::from_json) {
                        Ok(person) => inboxes.push(&person),
                        Err(Error::RequestLimit) => return Err(Error::RequestLimit),
                        Err(e) => warn!("Failed to resolve member {member} of {id}: {e}"),
                    }
                }
            }
            _ => {
                return Err(Error::malformed(format!(
                    "{id} is not deliverable, it has type {kind}"
                )))
            }
        }
    }

    info!("Resolved recipients of {activity}: {:?}", inboxes.inboxes);
    Ok(inboxes.inboxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FederationConfig,
        traits::tests::{person_json, MemoryBackend},
    };
    use serde_json::json;
    use std::sync::Arc;

    fn data(backend: Arc<MemoryBackend>) -> Result<Data, Error> {
        Ok(FederationConfig::builder()
            .backend(backend)
            .build()?
            .to_request_data())
    }

    fn urls(inboxes: &[Url]) -> Vec<&str> {
        inboxes.iter().map(Url::as_str).collect()
    }

    #[tokio::test]
    async fn test_self_follow_has_no_recipients() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        backend.add_person("https://example.com/u/alice", None)?;
        let data = data(backend)?;
        let follow = Activity::from_json(json!({
            "type": "Follow",
            "actor": "https://example.com/u/alice",
            "object": "https://example.com/u/alice"
        }))?;
        assert!(resolve_recipients(&follow, &data).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_shared_inbox_deduplicated() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        backend.add_person("https://remote.org/u/bob", Some("https://remote.org/inbox"))?;
        backend.add_person("https://remote.org/u/carol", Some("https://remote.org/inbox"))?;
        backend.add_person("https://other.net/u/dave", None)?;
        let data = data(backend)?;
        let note = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice",
            "to": ["https://www.w3.org/ns/activitystreams#Public", "https://remote.org/u/bob"],
            "cc": ["https://remote.org/u/carol", "as:Public", "https://example.com/u/alice"],
            "bcc": "https://other.net/u/dave"
        }))?;
        let recipients = resolve_recipients(&note, &data).await?;
        assert_eq!(
            vec!["https://remote.org/inbox", "https://other.net/u/dave/inbox"],
            urls(&recipients)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_inline_person_is_not_resolved() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        let data = data(backend)?;
        let note = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice",
            "to": [person_json("https://remote.org/u/bob", None)]
        }))?;
        let recipients = resolve_recipients(&note, &data).await?;
        assert_eq!(vec!["https://remote.org/u/bob/inbox"], urls(&recipients));
        Ok(())
    }

    #[tokio::test]
    async fn test_followers_collection_expanded() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        backend.add_person("https://remote.org/u/bob", Some("https://remote.org/inbox"))?;
        backend.add_person("https://other.net/u/dave", None)?;
        backend.insert_object(json!({
            "type": "Note",
            "id": "https://other.net/notes/1",
            "attributedTo": "https://other.net/u/dave"
        }))?;
        backend.insert_object(json!({
            "type": "OrderedCollection",
            "id": "https://example.com/u/alice/followers",
            "orderedItems": [
                "https://remote.org/u/bob",
                "https://example.com/u/alice",
                "https://www.w3.org/ns/activitystreams#Public",
                "https://other.net/notes/1",
                "https://other.net/u/dave"
            ]
        }))?;
        let data = data(backend)?;
        let note = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice",
            "cc": "https://example.com/u/alice/followers"
        }))?;
        let recipients = resolve_recipients(&note, &data).await?;
        assert_eq!(
            vec!["https://remote.org/inbox", "https://other.net/u/dave/inbox"],
            urls(&recipients)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_large_followers_collection() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        let mut followers = vec![];
        for i in 0..30 {
            let id = format!("https://remote{i}.org/u/user");
            backend.add_person(&id, None)?;
            followers.push(id);
        }
        backend.insert_object(json!({
            "type": "OrderedCollection",
            "id": "https://example.com/u/alice/followers",
            "orderedItems": followers
        }))?;
        let data = data(backend)?;
        let note = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice",
            "cc": "https://example.com/u/alice/followers"
        }))?;
        let recipients = resolve_recipients(&note, &data).await?;
        assert_eq!(30, recipients.len());
        assert_eq!("https://remote29.org/u/user/inbox", recipients[29].as_str());
        assert_eq!(0, data.request_count());
        Ok(())
    }

    #[tokio::test]
    async fn test_undeliverable_reference() -> Result<(), Error> {
        let backend = Arc::new(MemoryBackend::new("https://example.com")?);
        backend.insert_object(json!({
            "type": "Note",
            "id": "https://other.net/notes/1",
            "attributedTo": "https://other.net/u/dave"
        }))?;
        let data = data(backend)?;
        let note = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice",
            "to": "https://other.net/notes/1"
        }))?;
        let res = resolve_recipients(&note, &data).await;
        assert_eq!(Some(Error::MalformedActivity(String::new())), res.err());
        Ok(())
    }
}
