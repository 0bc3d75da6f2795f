//! # Vidora Client
//!
//! Caching API client for the Vidora video platform.
//!
//! Reads go through a [`TtlCache`](vidora_cache::TtlCache) keyed by URL,
//! method and parameters; writes bypass it and callers invalidate the
//! affected reads by key substring.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vidora_cache::SweepScheduler;
//! use vidora_client::{ClientSettings, RequestClient, VideoApi};
//!
//! let settings = ClientSettings::load(None)?;
//! let client = Arc::new(RequestClient::from_settings(&settings)?);
//! let sweeper = SweepScheduler::new(client.cache().clone(), settings.sweep_config()).start();
//!
//! let api = VideoApi::new(client);
//! let recommended = api.recommendations(&Default::default()).await?;
//! api.add_comment("v1", "great video").await?;
//!
//! sweeper.shutdown().await;
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod options;
pub mod params;
pub mod settings;
pub mod transport;

// Re-exports
pub use api::{Reaction, RecommendationQuery, VideoApi, VideoQuery};
pub use auth::TokenStore;
pub use client::{RequestClient, ResponseCache};
pub use error::{ClientError, TransportError};
pub use options::RequestOptions;
pub use params::Params;
pub use settings::ClientSettings;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

// Re-export vidora_cache for consumers
pub use vidora_cache;
