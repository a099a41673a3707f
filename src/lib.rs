//! Inbox and outbox processing for Activitypub activities.
//!
//! Activities are parsed and validated with [parse_activity]. A local actor publishes through
//! its [Outbox], which assigns ids, resolves the recipients and delivers the activity. Activities
//! received from other servers go through the [Inbox] of the addressed actor. All storage and
//! network access is done by a [Backend](traits::Backend) implementation, which is passed in
//! with the [FederationConfig](config::FederationConfig).
//!
//! ```
//! # use std::sync::Arc;
//! # use activitypub_boxes::{config::FederationConfig, traits::tests::MemoryBackend, Outbox};
//! # use activitypub_boxes::protocol::activity::Activity;
//! # use serde_json::json;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let backend = Arc::new(MemoryBackend::new("https://example.com")?);
//! let alice = backend.add_person("https://example.com/u/alice", None)?;
//! backend.add_person("https://remote.org/u/bob", None)?;
//! let data = FederationConfig::builder()
//!     .backend(backend.clone())
//!     .build()?
//!     .to_request_data();
//!
//! let mut note = Activity::from_json(json!({
//!     "type": "Note",
//!     "attributedTo": "https://example.com/u/alice",
//!     "content": "Hello",
//!     "to": ["https://remote.org/u/bob"]
//! }))?;
//! let report = Outbox::new(alice).post(&mut note, &data).await?;
//! assert_eq!("https://remote.org/u/bob/inbox", report.recipients[0].as_str());
//! # Ok::<(), activitypub_boxes::error::Error>(())
//! # }).unwrap();
//! ```

pub mod activities;
pub mod activity_sending;
pub mod config;
pub mod error;
pub mod fetch;
pub mod inbox;
pub mod kinds;
pub mod outbox;
pub mod protocol;
pub mod recipients;
pub mod registry;
pub mod traits;

pub use activity_sending::Delivery;
pub use inbox::{DropReason, Inbox, InboxOutcome};
pub use outbox::{Outbox, OutboxReport};
pub use registry::parse_activity;
