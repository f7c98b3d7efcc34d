use super::{
    cache::{CacheKey, CacheStore, MemoryCache},
    classify::{Classification, ErrorPolicy},
    envelope::{self, RequestEnvelope},
    methods::{capitalize, Method},
    transport::{http_client, HttpTransport, Transport},
    CallOutcome, DirectError,
};
use crate::{
    config::{Credentials, DirectConfig},
    oauth::{self, AccessToken, OAuthEndpoints},
};
use serde_json::{Map, Value};
use std::{fmt, sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info};

/// Where cached responses live, and for how long.
struct ResponseCache {
    store: Arc<dyn CacheStore>,
    prefix: String,
    ttl: Duration,
}

/// A client for the Direct JSON API.
///
/// Every remote procedure goes through [`DirectClient::call`], which returns
/// the outcome of that call alone. Nothing about a call is kept on the
/// client, so a single instance can serve concurrent tasks.
pub struct DirectClient {
    credentials: Credentials,
    response_type: String,
    api_url: String,
    token: Option<AccessToken>,
    /// The account we're operating on. Only used to make errors reproducible.
    login: Option<String>,
    transport: Box<dyn Transport>,
    /// Used for the token exchange, configured like the API transport.
    http: reqwest::Client,
    cache: Option<ResponseCache>,
    cache_prefix: String,
    cache_ttl: Duration,
    policy: ErrorPolicy,
    debug: bool,
    endpoints: OAuthEndpoints,
}

impl DirectClient {
    /// Creates a client talking HTTP to the API selected by `config`.
    ///
    /// If caching is enabled within `config`, responses are cached in memory.
    pub fn new(config: DirectConfig) -> Result<Self, DirectError> {
        let http = http_client(&config)?;
        let transport = HttpTransport::with_client(config.api_url(), http.clone());
        Ok(Self::from_parts(config, Box::new(transport), http))
    }

    /// Creates a client sending its requests through the given transport.
    ///
    /// The token exchange still goes over HTTP, configured by `config`.
    pub fn with_transport(
        config: DirectConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, DirectError> {
        let http = http_client(&config)?;
        Ok(Self::from_parts(config, Box::new(transport), http))
    }

    fn from_parts(
        config: DirectConfig,
        transport: Box<dyn Transport>,
        http: reqwest::Client,
    ) -> Self {
        let mut client = Self {
            credentials: config.credentials(),
            response_type: config.response_type.clone(),
            api_url: config.api_url().to_string(),
            token: None,
            login: None,
            transport,
            http,
            cache: None,
            cache_prefix: config.cache.prefix.clone(),
            cache_ttl: config.cache.ttl(),
            policy: config.error_policy,
            debug: config.debug,
            endpoints: OAuthEndpoints::default(),
        };

        if config.cache.enabled {
            client = client.with_cache(Arc::new(MemoryCache::new()));
        }
        client
    }

    /// Caches responses within `store`, using the configured prefix and TTL.
    pub fn with_cache(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(ResponseCache {
            store,
            prefix: self.cache_prefix.clone(),
            ttl: self.cache_ttl,
        });
        self
    }

    /// Changes how long cached responses stay valid.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        if let Some(cache) = &mut self.cache {
            cache.ttl = ttl;
        }
        self
    }

    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_oauth_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn set_token(&mut self, token: AccessToken) {
        self.token = Some(token);
    }

    pub fn set_login(&mut self, login: Option<String>) {
        self.login = login;
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The URL users must visit to authorize this application.
    pub fn authorize_url(&self, state: Option<&str>) -> String {
        oauth::authorize_url(
            &self.endpoints.authorize,
            &self.response_type,
            &self.credentials.client_id,
            state,
        )
    }

    /// Exchanges an authorization code, keeping the obtained token for future calls.
    pub async fn exchange_code(&mut self, code: &str) -> Result<&AccessToken, DirectError> {
        let token =
            oauth::exchange_code(&self.http, &self.endpoints, &self.credentials, code).await?;
        Ok(&*self.token.insert(token))
    }

    /// Builds the envelope [`DirectClient::call`] would send.
    pub fn envelope(&self, method: &str, params: Value) -> RequestEnvelope {
        RequestEnvelope::new(method, params, &self.credentials, self.token.as_ref())
    }

    /// Calls a procedure from the known catalogue.
    /// Without parameters, an empty object is sent.
    pub async fn dispatch(
        &self,
        method: Method,
        params: Option<Value>,
    ) -> Result<CallOutcome, DirectError> {
        self.call(method.name(), params.unwrap_or_else(empty_params))
            .await
    }

    /// Calls any procedure by its method-style name (e.g. `getCampaignsList`).
    ///
    /// The name is neither checked against the catalogue nor are the
    /// parameters validated; the API is left to judge both.
    pub async fn invoke(
        &self,
        name: &str,
        params: Option<Value>,
    ) -> Result<CallOutcome, DirectError> {
        self.call(&capitalize(name), params.unwrap_or_else(empty_params))
            .await
    }

    /// Performs a single API request.
    ///
    /// Remote errors outside the policy's fatal set are not failures: the
    /// call succeeds with no data, and the error is left on the outcome.
    pub async fn call(&self, method: &str, params: Value) -> Result<CallOutcome, DirectError> {
        let started = Instant::now();
        let envelope = self.envelope(method, params);
        let body = envelope.encode()?;

        let response = self.execute(method, body).await;
        if self.debug {
            info!(
                method,
                elapsed = ?started.elapsed(),
                failed = response.is_err(),
                "Direct API request finished"
            );
        }

        let Some(response) = response? else {
            return Err(DirectError::EmptyResponse {
                url: self.api_url.clone(),
                method: method.to_string(),
                params: envelope.param.to_string(),
                login: self.login.clone(),
            });
        };

        match self.policy.classify(&response) {
            Classification::Pass => Ok(CallOutcome::from_response(response)),
            Classification::SuppressedEmpty(error) => {
                debug!(method, code = error.code, message = %error.message, "suppressing remote error");
                Ok(CallOutcome::suppressed(error))
            }
            Classification::Fatal(error) => Err(DirectError::RemoteFatal {
                method: method.to_string(),
                error,
                params: envelope.param.to_string(),
                login: self.login.clone(),
            }),
        }
    }

    /// Obtains the decoded response for `body`, from the cache if possible.
    async fn execute(&self, method: &str, body: String) -> Result<Option<Value>, DirectError> {
        let Some(cache) = &self.cache else {
            return self.send(body).await;
        };

        let key = CacheKey::derive(&cache.prefix, &body);
        if let Some(response) = cache.store.get(&key).await {
            debug!(method, "serving response from cache");
            return Ok(Some(response));
        }

        debug!(method, "cache miss");
        let response = self.send(body).await?;
        if let Some(response) = &response {
            cache.store.set(key, response.clone(), cache.ttl).await;
        }
        Ok(response)
    }

    async fn send(&self, body: String) -> Result<Option<Value>, DirectError> {
        let raw = self.transport.post(body).await?;
        Ok(envelope::decode(&raw))
    }
}

fn empty_params() -> Value {
    Value::Object(Map::new())
}

impl fmt::Debug for DirectClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectClient")
            .field("credentials", &self.credentials)
            .field("api_url", &self.api_url)
            .field("token", &self.token)
            .field("login", &self.login)
            .field("cache", &self.cache.is_some())
            .field("policy", &self.policy)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
