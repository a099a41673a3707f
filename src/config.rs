//! Configuration for this library, with the backend and processing limits
//!
//! Use [FederationConfig::builder](crate::config::FederationConfig::builder) to initialize it.
//!
//! ```
//! # use std::sync::Arc;
//! # use activitypub_boxes::config::FederationConfig;
//! # use activitypub_boxes::traits::tests::MemoryBackend;
//! let backend = Arc::new(MemoryBackend::new("https://example.com")?);
//! let config = FederationConfig::builder()
//!     .backend(backend)
//!     .fetch_limit(50)
//!     .build()?;
//! let data = config.to_request_data();
//! assert_eq!(0, data.request_count());
//! # Ok::<(), activitypub_boxes::error::Error>(())
//! ```

use crate::{error::Error, traits::Backend};
use derive_builder::Builder;
use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

/// Configuration for this library
#[derive(Builder, Clone)]
#[builder(build_fn(private, name = "partial_build"))]
pub struct FederationConfig {
    /// Storage and transport collaborator. Required, building without it fails with
    /// [Error::UninitializedBackend].
    #[builder(setter(custom))]
    pub(crate) backend: Arc<dyn Backend>,
    /// Maximum number of linked collection pages which may be resolved while processing one
    /// activity. This bounds recursive resolution through pages which link to further pages.
    /// Lookups of single objects and actors are not counted.
    #[builder(default = "20")]
    pub(crate) fetch_limit: u32,
    /// Number of deliveries which can be in flight concurrently when an activity is sent out.
    /// Setting this to `0` means that there is no limit.
    #[builder(default = "0")]
    pub(crate) delivery_concurrency: usize,
    /// Deadline for delivering to a single inbox. A delivery which takes longer is reported
    /// as failed, without affecting the other recipients.
    #[builder(default = "Duration::from_secs(10)")]
    pub(crate) delivery_timeout: Duration,
    /// Deliver to one inbox after the other, in the order of resolved recipients. This makes
    /// tests deterministic. Do not use for production.
    #[builder(default = "false")]
    pub(crate) debug: bool,
}

impl FederationConfig {
    /// Returns a new config builder with default values.
    pub fn builder() -> FederationConfigBuilder {
        FederationConfigBuilder::default()
    }

    /// Create new [Data] from this, with its fetch counter set to 0.
    pub fn to_request_data(&self) -> Data {
        Data {
            config: self.clone(),
            request_counter: Default::default(),
        }
    }

    /// The configured backend
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl FederationConfigBuilder {
    /// Sets the storage and transport collaborator
    pub fn backend<B: Backend + 'static>(&mut self, backend: Arc<B>) -> &mut Self {
        let backend: Arc<dyn Backend> = backend;
        self.backend = Some(backend);
        self
    }

    /// Constructs a new config instance with the values supplied to builder.
    ///
    /// Values which are not explicitly specified use the defaults.
    pub fn build(&mut self) -> Result<FederationConfig, Error> {
        if self.backend.is_none() {
            return Err(Error::UninitializedBackend);
        }
        self.partial_build().map_err(Error::other)
    }
}

/// Stores data for processing one activity.
///
/// It gives access to the backend. Additionally it contains a counter for resolved collection
/// pages, which prevents unbounded recursive fetching. The inbox and outbox pipelines start each
/// run with a fresh counter, so one instance can be reused for many activities.
pub struct Data {
    pub(crate) config: FederationConfig,
    pub(crate) request_counter: AtomicU32,
}

impl Data {
    /// The configured backend
    pub fn backend(&self) -> &dyn Backend {
        self.config.backend()
    }

    /// Returns a new instance of `Data` with request counter set to 0.
    pub fn reset_request_count(&self) -> Self {
        self.config.to_request_data()
    }

    /// Number of collection pages resolved with this data.
    pub fn request_count(&self) -> u32 {
        self.request_counter.load(Ordering::Relaxed)
    }
}
