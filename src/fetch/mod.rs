//! Utilities for resolving identifiers through the backend

use crate::{config::Data, error::Error};
use serde_json::Value;
use std::sync::atomic::Ordering;
use tracing::debug;
use url::Url;

/// Walks the members of collections
pub mod collection;

/// Resolve an identifier to its JSON representation with [crate::traits::Backend::fetch_iri].
pub async fn fetch_iri(iri: &Url, data: &Data) -> Result<Value, Error> {
    debug!("Resolving {iri}");
    data.backend().fetch_iri(iri).await
}

/// Resolve a linked collection page, counting it against the fetch limit.
///
/// Every call increments [Data::request_count] by one. If the value exceeds
/// [crate::config::FederationConfigBuilder::fetch_limit], resolution is aborted with
/// [Error::RequestLimit]. This prevents unbounded recursion through collection pages which link
/// to each other.
pub(crate) async fn fetch_page(iri: &Url, data: &Data) -> Result<Value, Error> {
    let counter = data.request_counter.fetch_add(1, Ordering::SeqCst);
    if counter >= data.config.fetch_limit {
        return Err(Error::RequestLimit);
    }
    fetch_iri(iri, data).await
}
