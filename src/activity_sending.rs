//! Fan-out of a serialized activity to the inboxes of its recipients

use crate::{config::Data, error::Error, protocol::person::Person};
use futures::{stream, StreamExt};
use std::fmt::{Display, Formatter};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// Outcome of delivering an activity to one inbox
#[derive(Debug)]
pub struct Delivery {
    pub inbox: Url,
    pub result: Result<(), Error>,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Display for Delivery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.result {
            Ok(()) => write!(f, "delivered to {}", self.inbox),
            Err(e) => write!(f, "failed to deliver to {}: {e}", self.inbox),
        }
    }
}

/// Sends the same payload to every inbox, on behalf of `actor`.
///
/// Deliveries are independent of each other: a failed or slow inbox is reported in its own
/// [Delivery] and doesn't affect the others. Each delivery is bounded by
/// [delivery_timeout](crate::config::FederationConfigBuilder::delivery_timeout). The number of
/// concurrent deliveries is limited by
/// [delivery_concurrency](crate::config::FederationConfigBuilder::delivery_concurrency), and in
/// debug mode inboxes are processed one after another.
pub async fn deliver(actor: &Person, payload: &str, inboxes: &[Url], data: &Data) -> Vec<Delivery> {
    let config = &data.config;
    let limit = if config.debug {
        1
    } else if config.delivery_concurrency == 0 {
        inboxes.len().max(1)
    } else {
        config.delivery_concurrency
    };

    let deliveries: Vec<_> = inboxes
        .iter()
        .map(|inbox| deliver_to_inbox(actor, payload, inbox, data))
        .collect();
    stream::iter(deliveries)
        .buffer_unordered(limit)
        .collect()
        .await
}

async fn deliver_to_inbox(actor: &Person, payload: &str, inbox: &Url, data: &Data) -> Delivery {
    let delivery_timeout = data.config.delivery_timeout;
    debug!("Sending activity to {inbox}");
    let send = data.backend().post_to_remote_inbox(actor, payload, inbox);
    let result = match timeout(delivery_timeout, send).await {
        Ok(result) => result,
        Err(_) => Err(Error::Other(format!(
            "delivery to {inbox} timed out after {delivery_timeout:?}"
        ))),
    };
    let delivery = Delivery {
        inbox: inbox.clone(),
        result,
    };
    if delivery.is_success() {
        debug!("{delivery}");
    } else {
        warn!("{delivery}");
    }
    delivery
}
