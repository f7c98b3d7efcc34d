use super::{RemoteError, TransportError};
use thiserror::Error;

/// Possible failures when talking to the API.
///
/// Remote errors outside the fatal set never show up here; they are
/// reported on an otherwise successful [`super::CallOutcome`].
#[derive(Debug, Error)]
pub enum DirectError {
    /// We never received a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response arrived, but was empty or not JSON.
    #[error("unable to open {url}: no usable response to {method}({params}){}", login_suffix(.login))]
    EmptyResponse {
        url: String,
        method: String,
        params: String,
        login: Option<String>,
    },

    /// The API reported an error we must not paper over.
    #[error("request {method}: {error}{}; params: {params}", login_suffix(.login))]
    RemoteFatal {
        method: String,
        error: RemoteError,
        params: String,
        login: Option<String>,
    },

    #[error("unable to encode request envelope: {0}")]
    Encode(serde_json::Error),

    /// The token endpoint refused our authorization code.
    #[error("OAuth2 token exchange failed: {error}{}", description_suffix(.description))]
    OAuth {
        error: String,
        description: Option<String>,
    },

    #[error("unable to parse token response: {0}")]
    TokenResponse(serde_json::Error),

    #[error("stored credentials are malformed: {0}")]
    StoredCredentials(serde_json::Error),

    #[error("credential storage failed: {0}")]
    Storage(#[from] keyring::Error),
}

impl DirectError {
    /// The error reported by the API, if this failure carries one.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            DirectError::RemoteFatal { error, .. } => Some(error),
            _ => None,
        }
    }
}

fn login_suffix(login: &Option<String>) -> String {
    match login {
        Some(login) if !login.is_empty() => format!(" (login: {login})"),
        _ => String::new(),
    }
}

fn description_suffix(description: &Option<String>) -> String {
    match description {
        Some(description) => format!(" ({description})"),
        None => String::new(),
    }
}
