use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeSet, fmt};

/// The message the API reports when a campaign simply has nothing to report.
/// ("No statistics for this campaign.")
pub const NO_STATISTICS_MESSAGE: &str = "Нет статистики для данной кампании";

/// Error codes that should terminate a call rather than yield an empty result.
pub const DEFAULT_FATAL_CODES: [i64; 6] = [53, 54, 58, 510, 251, 513];

/// An error reported by the API within an otherwise valid response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteError {
    pub code: i64,
    pub message: String,
    pub detail: Option<String>,
}

impl RemoteError {
    /// Reads `error_code`/`error_str`/`error_detail` from a decoded response.
    ///
    /// Both the code and the message must be present (and non-null).
    /// The API has been observed sending codes both as numbers and as strings.
    /// Whole floats such as `510.0` count as integers; anything else reads as 0.
    pub fn from_response(response: &Value) -> Option<Self> {
        let code = response.get("error_code").filter(|code| !code.is_null())?;
        let message = response.get("error_str").filter(|message| !message.is_null())?;

        let code = code
            .as_i64()
            .or_else(|| code.as_f64().and_then(whole_number))
            .or_else(|| code.as_str().and_then(parse_code))
            .unwrap_or(0);
        let detail = response
            .get("error_detail")
            .filter(|detail| !detail.is_null())
            .map(text_of);

        Some(Self {
            code,
            message: text_of(message),
            detail,
        })
    }
}

/// The full error text: code, message and (if any) detail.
impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)?;
        match &self.detail {
            Some(detail) if !detail.is_empty() => write!(f, " {detail}"),
            _ => Ok(()),
        }
    }
}

fn whole_number(code: f64) -> Option<i64> {
    (code.fract() == 0.0 && code.abs() <= i64::MAX as f64).then_some(code as i64)
}

fn parse_code(code: &str) -> Option<i64> {
    let code = code.trim();
    code.parse()
        .ok()
        .or_else(|| code.parse::<f64>().ok().and_then(whole_number))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// How a decoded response should be treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No error present. Proceed with extracting `data`.
    Pass,
    /// An error was reported, but the call should succeed without data.
    SuppressedEmpty(RemoteError),
    /// The call must fail.
    Fatal(RemoteError),
}

/// Decides which remote errors are fatal.
///
/// Suppressed messages win over fatal codes: a "no statistics" error is
/// never fatal, whatever code it arrives with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorPolicy {
    pub fatal_codes: BTreeSet<i64>,
    pub suppressed_messages: Vec<String>,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            fatal_codes: DEFAULT_FATAL_CODES.into_iter().collect(),
            suppressed_messages: vec![NO_STATISTICS_MESSAGE.to_string()],
        }
    }
}

impl ErrorPolicy {
    pub fn classify(&self, response: &Value) -> Classification {
        let Some(error) = RemoteError::from_response(response) else {
            return Classification::Pass;
        };

        if self.suppressed_messages.contains(&error.message) {
            Classification::SuppressedEmpty(error)
        } else if self.fatal_codes.contains(&error.code) {
            Classification::Fatal(error)
        } else {
            Classification::SuppressedEmpty(error)
        }
    }
}
