use url::form_urlencoded;

/// The OAuth2 authorization page users are sent to.
pub const AUTHORIZATION_ENDPOINT: &str = "https://oauth.yandex.ru/authorize";

/// Builds the URL a user must visit to grant us access.
///
/// After approval, they are redirected back with a code we can exchange for a
/// token. `state` is passed through untouched, and omitted entirely if empty.
pub fn authorize_url(
    endpoint: &str,
    response_type: &str,
    client_id: &str,
    state: Option<&str>,
) -> String {
    // Standard OAuth2 query parameters.
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("response_type", response_type)
        .append_pair("client_id", client_id);
    if let Some(state) = state.filter(|state| !state.is_empty()) {
        query.append_pair("state", state);
    }

    format!("{endpoint}?{}", query.finish())
}
