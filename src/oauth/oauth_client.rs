use super::OAuthEndpoints;
use crate::{api::DirectError, api::TransportError, config::Credentials};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The endpoint leveraged for obtaining an access token.
pub const ACCESS_TOKEN_ENDPOINT: &str = "https://oauth.yandex.ru/token";

/// An opaque OAuth2 access token, sent within every request envelope.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

// Tokens are as good as passwords; keep them out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// The token endpoint answers with either a token or an error.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges an authorization code for an access token via OAuth2.
///
/// `http` should come from [`crate::api::http_client`], so that the configured
/// user agent, timeouts and TLS settings apply here too.
pub async fn exchange_code(
    http: &reqwest::Client,
    endpoints: &OAuthEndpoints,
    credentials: &Credentials,
    code: &str,
) -> Result<AccessToken, DirectError> {
    let result = http
        .post(&endpoints.token)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .await
        .map_err(TransportError::Http)?;

    // Refusals come back as 400 with a JSON body, so we parse regardless of status.
    let status = result.status();
    let response_text = result.text().await.map_err(TransportError::Http)?;
    debug!(%status, "received token response");

    let response: TokenResponse =
        serde_json::from_str(&response_text).map_err(DirectError::TokenResponse)?;
    match response {
        TokenResponse {
            access_token: Some(token),
            error: None,
            ..
        } => Ok(AccessToken::new(token)),
        TokenResponse {
            error,
            error_description,
            ..
        } => Err(DirectError::OAuth {
            error: error.unwrap_or_else(|| format!("no access token in HTTP {status} response")),
            description: error_description,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::http_client, config::DirectConfig};
    use mockito::Matcher;

    fn http() -> reqwest::Client {
        http_client(&DirectConfig::default()).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials {
            client_id: "app".to_string(),
            client_secret: "secret".to_string(),
            locale: "ru".to_string(),
            use_sandbox: false,
        }
    }

    fn endpoints(server: &mockito::ServerGuard) -> OAuthEndpoints {
        OAuthEndpoints {
            token: format!("{}/token", server.url()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn code_is_exchanged_for_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "1234567".into()),
                Matcher::UrlEncoded("client_id".into(), "app".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret".into()),
            ]))
            .with_body(r#"{"access_token": "AQAAAAA", "token_type": "bearer", "expires_in": 31536000}"#)
            .create_async()
            .await;

        let token = exchange_code(&http(), &endpoints(&server), &credentials(), "1234567")
            .await
            .unwrap();

        assert_eq!(token.as_str(), "AQAAAAA");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refusals_carry_remote_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "Code has expired"}"#)
            .create_async()
            .await;

        let error = exchange_code(&http(), &endpoints(&server), &credentials(), "stale")
            .await
            .unwrap_err();

        match error {
            DirectError::OAuth { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description.as_deref(), Some("Code has expired"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_responses_are_parse_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let error = exchange_code(&http(), &endpoints(&server), &credentials(), "code")
            .await
            .unwrap_err();
        assert!(matches!(error, DirectError::TokenResponse(_)));
    }

    #[tokio::test]
    async fn configured_user_agent_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("user-agent", "directctl-tests")
            .with_body(r#"{"access_token": "AQAAAAA"}"#)
            .create_async()
            .await;

        let config = DirectConfig {
            user_agent: "directctl-tests".to_string(),
            ..Default::default()
        };
        let http = http_client(&config).unwrap();
        exchange_code(&http, &endpoints(&server), &credentials(), "1234567")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn tokens_are_redacted() {
        assert_eq!(
            format!("{:?}", AccessToken::new("very-secret")),
            "AccessToken(<redacted>)"
        );
    }
}
