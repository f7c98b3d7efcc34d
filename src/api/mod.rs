mod cache;
mod classify;
mod client;
mod envelope;
mod error;
mod methods;
mod outcome;
mod transport;

pub use cache::{CacheKey, CacheStore, MemoryCache, PURGE_INTERVAL};
pub use classify::{
    Classification, ErrorPolicy, RemoteError, DEFAULT_FATAL_CODES, NO_STATISTICS_MESSAGE,
};
pub use client::DirectClient;
pub use envelope::{decode, normalize, RequestEnvelope};
pub use error::DirectError;
pub use methods::{capitalize, Method, UnknownMethod};
pub use outcome::CallOutcome;
pub use transport::{http_client, HttpTransport, Transport, TransportError};
