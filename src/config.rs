use crate::api::ErrorPolicy;
use serde::Deserialize;
use std::time::Duration;

/// The production JSON endpoint of the live v4 API.
pub const JSON_API_URL: &str = "https://api.direct.yandex.ru/live/v4/json/";

/// The sandbox counterpart, which accepts the same envelopes against test accounts.
pub const SANDBOX_JSON_API_URL: &str = "https://api-sandbox.direct.yandex.ru/live/v4/json/";

/// Used whenever no locale (or an empty one) is configured.
pub const DEFAULT_LOCALE: &str = "ru";

/// Sent with every API request.
pub const DEFAULT_USER_AGENT: &str = concat!("directctl/", env!("CARGO_PKG_VERSION"));

/// Everything needed to construct a [`crate::DirectClient`].
///
/// All fields have defaults, so a configuration can be deserialized from a
/// partial document (or built with `..Default::default()`) and only name
/// the application credentials.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DirectConfig {
    /// The OAuth2 application ID, also sent as `application_id` in every envelope.
    pub client_id: String,
    /// The OAuth2 application password. Only used when exchanging codes.
    pub client_secret: String,
    /// The `response_type` used within authorization URLs.
    pub response_type: String,
    /// Which language the API should respond with.
    pub locale: String,
    /// Whether to talk to the sandbox rather than production.
    pub use_sandbox: bool,
    pub cache: CacheSettings,
    /// Logs the duration of every call at `info` level.
    pub debug: bool,
    pub connect_timeout_secs: u64,
    /// No read timeout is applied when unset.
    pub read_timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Disables TLS certificate verification. Only ever set this knowingly.
    pub accept_invalid_certs: bool,
    pub error_policy: ErrorPolicy,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            response_type: "code".to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            use_sandbox: false,
            cache: CacheSettings::default(),
            debug: false,
            connect_timeout_secs: 10,
            read_timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl DirectConfig {
    /// The endpoint all envelopes are POSTed to.
    pub fn api_url(&self) -> &'static str {
        if self.use_sandbox {
            SANDBOX_JSON_API_URL
        } else {
            JSON_API_URL
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }

    /// Extracts the immutable application credentials.
    pub fn credentials(&self) -> Credentials {
        // An empty locale would be rejected by the API, so we fall back to our default.
        let locale = if self.locale.trim().is_empty() {
            DEFAULT_LOCALE.to_string()
        } else {
            self.locale.clone()
        };

        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            locale,
            use_sandbox: self.use_sandbox,
        }
    }
}

impl std::fmt::Debug for DirectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectConfig")
            .field("client_id", &self.client_id)
            .field("locale", &self.locale)
            .field("use_sandbox", &self.use_sandbox)
            .field("cache", &self.cache)
            .field("debug", &self.debug)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("error_policy", &self.error_policy)
            .finish_non_exhaustive()
    }
}

/// Response caching. Disabled unless explicitly enabled.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
    /// Distinguishes our entries from anyone else sharing the same store.
    pub prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 300,
            prefix: "_directApi".to_string(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// The application's identity towards the API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub locale: String,
    pub use_sandbox: bool,
}

// The secret should never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("locale", &self.locale)
            .field("use_sandbox", &self.use_sandbox)
            .finish()
    }
}
