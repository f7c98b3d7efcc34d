//! The request envelope and the wire encoding on both sides of it.

use super::DirectError;
use crate::{config::Credentials, oauth::AccessToken};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// The body of every API request.
///
/// Fields are serialized in declaration order, which is also the order the API documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    pub method: String,
    pub param: Value,
    pub locale: String,
    pub application_id: String,
    /// Serialized as `null` when we have no token yet; the API will reject the call itself.
    pub token: Option<AccessToken>,
}

impl RequestEnvelope {
    /// Builds a fresh envelope, normalizing every string within `param`.
    pub fn new(
        method: impl Into<String>,
        param: Value,
        credentials: &Credentials,
        token: Option<&AccessToken>,
    ) -> Self {
        Self {
            method: method.into(),
            param: normalize(param),
            locale: credentials.locale.clone(),
            application_id: credentials.client_id.clone(),
            token: token.cloned(),
        }
    }

    /// Serializes this envelope to its wire form.
    pub fn encode(&self) -> Result<String, DirectError> {
        serde_json::to_string(self).map_err(DirectError::Encode)
    }
}

/// Brings every string leaf into Unicode Normalization Form C.
///
/// Arrays and object values are recursed into; object keys, numbers,
/// booleans and null are left alone. Normalizing twice changes nothing.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::String(text) if is_nfc(&text) => Value::String(text),
        Value::String(text) => Value::String(text.nfc().collect()),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Parses a raw response body.
///
/// Returns `None` when there is nothing usable: an empty body, one that
/// isn't JSON, or a literal `null`. Empty objects and arrays are still
/// responses, and are returned as such.
pub fn decode(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("response body was empty");
        return None;
    }

    match serde_json::from_slice(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(error) => {
            debug!(%error, "unable to parse response body");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "app-id".to_string(),
            client_secret: "secret".to_string(),
            locale: "en".to_string(),
            use_sandbox: false,
        }
    }

    #[test]
    fn envelope_serializes_in_wire_order() {
        let token = AccessToken::new("token");
        let envelope = RequestEnvelope::new(
            "GetBalance",
            json!([123, 456]),
            &credentials(),
            Some(&token),
        );

        assert_eq!(
            envelope.encode().unwrap(),
            r#"{"method":"GetBalance","param":[123,456],"locale":"en","application_id":"app-id","token":"token"}"#
        );
    }

    #[test]
    fn missing_token_is_null() {
        let envelope = RequestEnvelope::new("PingAPI", json!({}), &credentials(), None);
        let encoded: Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(encoded["token"], Value::Null);
    }

    #[test]
    fn normalize_composes_nested_strings() {
        // "Кампания" with a decomposed "й" (и + combining breve), and a decomposed "é".
        let decomposed = json!({
            "Name": "Кампани\u{0438}\u{0306}",
            "Phrases": [{"Phrase": "cafe\u{0301}"}],
            "Limit": 10
        });

        let normalized = normalize(decomposed);
        assert_eq!(normalized["Name"], "Кампаний");
        assert_eq!(normalized["Phrases"][0]["Phrase"], "café");
        assert_eq!(normalized["Limit"], 10);
    }

    #[test]
    fn normalize_is_idempotent_and_ignores_scalars() {
        let value = json!({
            "text": "cafe\u{0301}",
            "number": 1.5,
            "flag": true,
            "nothing": null,
            "list": ["a", 2, false]
        });

        let once = normalize(value);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);

        for scalar in [json!(42), json!(-0.25), json!(true), Value::Null] {
            assert_eq!(normalize(scalar.clone()), scalar);
        }
    }

    #[test]
    fn only_param_is_normalized() {
        let mut credentials = credentials();
        credentials.locale = "e\u{0301}".to_string();
        let envelope = RequestEnvelope::new("X", json!(["e\u{0301}"]), &credentials, None);
        assert_eq!(envelope.param, json!(["é"]));
        assert_eq!(envelope.locale, "e\u{0301}");
    }

    #[test]
    fn decode_distinguishes_empty_bodies_from_empty_containers() {
        assert_eq!(decode(b""), None);
        assert_eq!(decode(b"  \n"), None);
        assert_eq!(decode(b"<html>Bad Gateway</html>"), None);
        assert_eq!(decode(b"null"), None);

        assert_eq!(decode(b"{}"), Some(json!({})));
        assert_eq!(decode(b"[]"), Some(json!([])));
        assert_eq!(
            decode(br#"{"data": {"Balance": 1}}"#),
            Some(json!({"data": {"Balance": 1}}))
        );
    }
}
