use crate::{
    activities::{build, expect_kind, now},
    config::Data,
    error::Error,
    kinds::{public, ActivityType},
    protocol::{activity::Activity, person::Person, tombstone::Tombstone},
    traits::ActivityHandler,
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use url::Url;

/// Fields of a note which are copied onto the `Create` wrapping it
const CREATE_FIELDS: [&str; 6] = ["published", "to", "bto", "cc", "bcc", "audience"];

#[derive(Debug)]
pub struct NoteHandler;

#[async_trait]
impl ActivityHandler for NoteHandler {
    fn kind(&self) -> ActivityType {
        ActivityType::Note
    }

    fn init(&self, fields: &mut Map<String, Value>) -> Result<(), Error> {
        fields
            .entry("sensitive")
            .or_insert_with(|| Value::Bool(false));
        Ok(())
    }

    async fn recipients(&self, note: &Activity, _data: &Data) -> Result<Vec<Value>, Error> {
        Ok(note.addressing())
    }
}

impl Activity {
    /// Wraps this note into a `Create`, sent by its author.
    pub fn build_create(&self) -> Result<Activity, Error> {
        expect_kind(self, ActivityType::Note)?;
        let note = self.to_json(true, false)?;
        let mut create = Map::new();
        create.insert("actor".to_string(), json!(self.owner_id()?));
        for field in CREATE_FIELDS {
            if let Some(value) = note.get(field) {
                create.insert(field.to_string(), value.clone());
            }
        }
        create.insert("object".to_string(), note);
        build(ActivityType::Create, Value::Object(create))
    }

    /// A `Like` of this note by `actor`
    pub fn build_like(&self, actor: &Person) -> Result<Activity, Error> {
        expect_kind(self, ActivityType::Note)?;
        build(
            ActivityType::Like,
            json!({
                "actor": actor.id,
                "object": self.note_id()?,
            }),
        )
    }

    /// Shares this note with the public and the followers of `announcer`.
    pub fn build_announce(&self, announcer: &Person) -> Result<Activity, Error> {
        expect_kind(self, ActivityType::Note)?;
        let mut cc = vec![];
        if let Some(followers) = &announcer.followers {
            cc.push(json!(followers));
        }
        cc.push(json!(self.owner_id()?));
        build(
            ActivityType::Announce,
            json!({
                "actor": announcer.id,
                "object": self.note_id()?,
                "to": [public()],
                "cc": cc,
                "published": now(),
            }),
        )
    }

    /// A `Delete` of this note, with a tombstone in place of the note itself.
    pub fn build_delete(&self) -> Result<Activity, Error> {
        expect_kind(self, ActivityType::Note)?;
        let tombstone = Tombstone::new(self.note_id()?.clone());
        build(
            ActivityType::Delete,
            json!({
                "actor": self.owner_id()?,
                "object": tombstone,
            }),
        )
    }

    /// Snapshot of this note after it was deleted.
    pub fn get_tombstone(&self, deleted: Option<String>) -> Result<Tombstone, Error> {
        expect_kind(self, ActivityType::Note)?;
        let mut tombstone = Tombstone::new(self.note_id()?.clone());
        tombstone.published = self.field("published").cloned();
        tombstone.updated.clone_from(&deleted);
        tombstone.deleted = deleted;
        Ok(tombstone)
    }

    fn note_id(&self) -> Result<&Url, Error> {
        self.id()
            .ok_or_else(|| Error::malformed(format!("{self} has no id yet")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::activity::ObjectRef;

    fn note() -> Result<Activity, Error> {
        Activity::from_json(json!({
            "type": "Note",
            "id": "https://example.com/outbox/7/activity",
            "attributedTo": "https://example.com/u/alice",
            "content": "hello world",
            "published": "2024-03-01T10:00:00Z",
            "to": "https://www.w3.org/ns/activitystreams#Public",
            "cc": ["https://example.com/u/alice/followers"],
            "bcc": ["https://remote.org/u/dave"]
        }))
    }

    #[test]
    fn test_sensitive_default() -> Result<(), Error> {
        assert_eq!(Some(&json!(false)), note()?.field("sensitive"));
        let flagged = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice",
            "sensitive": true
        }))?;
        assert_eq!(Some(&json!(true)), flagged.field("sensitive"));
        Ok(())
    }

    #[test]
    fn test_build_create_copies_addressing() -> Result<(), Error> {
        let note = note()?;
        let create = note.build_create()?;
        assert_eq!(ActivityType::Create, create.kind());
        assert_eq!(note.attributed_to(), create.actor());
        assert_eq!(note.to(), create.to());
        assert_eq!(note.cc(), create.cc());
        assert_eq!(note.bcc(), create.bcc());
        assert_eq!(
            Some(&json!("2024-03-01T10:00:00Z")),
            create.field("published")
        );
        let json = create.to_json(false, false)?;
        assert_eq!(json!("hello world"), json["object"]["content"]);
        assert!(json["object"].get("@context").is_none());
        Ok(())
    }

    #[test]
    fn test_build_announce() -> Result<(), Error> {
        let announcer = Person::from_json(json!({
            "type": "Person",
            "id": "https://remote.org/u/bob",
            "inbox": "https://remote.org/u/bob/inbox",
            "followers": "https://remote.org/u/bob/followers"
        }))?;
        let announce = note()?.build_announce(&announcer)?;
        assert_eq!(Some(&announcer.id), announce.actor());
        assert_eq!(&[json!(public())], announce.to());
        assert_eq!(
            &[
                json!("https://remote.org/u/bob/followers"),
                json!("https://example.com/u/alice")
            ],
            announce.cc()
        );
        assert!(announce.field("published").is_some());
        Ok(())
    }

    #[test]
    fn test_build_like() -> Result<(), Error> {
        let actor = Person::new(
            "https://remote.org/u/bob".parse()?,
            "https://remote.org/u/bob/inbox".parse()?,
        );
        let like = note()?.build_like(&actor)?;
        assert_eq!(Some(&actor.id), like.actor());
        let note_id: Url = "https://example.com/outbox/7/activity".parse()?;
        assert_eq!(Some(note_id), like.object().and_then(ObjectRef::id));
        Ok(())
    }

    #[test]
    fn test_build_delete_and_tombstone() -> Result<(), Error> {
        let note = note()?;
        let delete = note.build_delete()?;
        assert_eq!(note.attributed_to(), delete.actor());
        assert_eq!(
            Some("Tombstone"),
            delete.object().and_then(ObjectRef::kind)
        );

        let tombstone = note.get_tombstone(Some("2024-03-02T00:00:00Z".to_string()))?;
        assert_eq!(note.id(), Some(&tombstone.id));
        assert_eq!(Some(json!("2024-03-01T10:00:00Z")), tombstone.published);
        assert_eq!(tombstone.deleted, tombstone.updated);

        let unsaved = Activity::from_json(json!({
            "type": "Note",
            "attributedTo": "https://example.com/u/alice"
        }))?;
        assert_eq!(
            Some(Error::MalformedActivity(String::new())),
            unsaved.build_delete().err()
        );
        Ok(())
    }
}
