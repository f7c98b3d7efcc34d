//! A client for the Yandex.Direct JSON API (live v4).
//!
//! Any remote procedure can be called through [`DirectClient`], either from
//! the [`Method`] catalogue or by name. The client takes care of the request
//! envelope, the OAuth2 token, optional response caching, and deciding which
//! errors reported by the API should fail a call.
//!
//! ```no_run
//! use directctl::{oauth::AccessToken, DirectClient, DirectConfig, Method};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), directctl::DirectError> {
//! let config = DirectConfig {
//!     client_id: "app-id".to_string(),
//!     ..Default::default()
//! };
//! let client = DirectClient::new(config)?.with_token(AccessToken::new("token"));
//!
//! let outcome = client
//!     .dispatch(Method::GetSummaryStat, Some(json!({"CampaignIDS": [123]})))
//!     .await?;
//! if let Some(error) = &outcome.error {
//!     println!("nothing to report: {error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod oauth;

pub use api::{CallOutcome, DirectClient, DirectError, Method, RemoteError};
pub use config::{CacheSettings, Credentials, DirectConfig};
