//! skypost - a small Bluesky client.
//!
//! This library logs in to an AT Protocol service, fetches profiles and
//! publishes posts. All calls go through one [`ApiClient`], which is built
//! from three collaborators: a [`ClientConfig`], a [`Transport`] that moves
//! bytes, and a [`CredentialStore`] that remembers the session across
//! restarts.
//!
//! # Example
//!
//! ```no_run
//! use skypost::{ApiClient, ClientConfig, Credentials, FileStore};
//!
//! # async fn example() -> Result<(), skypost::Error> {
//! let store = FileStore::new("/tmp/skypost/credentials.json");
//! let client = ApiClient::connect(ClientConfig::default(), store)?;
//!
//! if !client.is_logged_in()? {
//!     client
//!         .authenticate(Credentials::new("alice.bsky.social", "app-password"))
//!         .await?;
//! }
//!
//! client.create_post("Hello, world!").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod transport;
pub mod types;
mod xrpc;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, AuthSession, Credentials, RefreshToken};
pub use client::ApiClient;
pub use config::{ClientConfig, RetryPolicy};
pub use error::Error;
pub use model::{PostDraft, Profile};
pub use store::{CredentialStore, FileStore, MemoryStore};
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpTransport, Transport};
pub use types::{Did, ServiceUrl};

/// Result type alias using the crate's Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
