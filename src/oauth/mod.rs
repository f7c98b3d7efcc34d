mod authorize;
mod oauth_client;
pub mod storage;

pub use authorize::{authorize_url, AUTHORIZATION_ENDPOINT};
pub use oauth_client::{exchange_code, AccessToken, ACCESS_TOKEN_ENDPOINT};

/// Where to send users for authorization, and where to exchange their codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub authorize: String,
    pub token: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            authorize: AUTHORIZATION_ENDPOINT.to_string(),
            token: ACCESS_TOKEN_ENDPOINT.to_string(),
        }
    }
}
