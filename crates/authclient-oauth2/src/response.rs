// Response normalizer: decodes provider bodies (JSON, form-encoded, or JSON
// wrapped in a JSONP-style `callback( ... );` envelope) into a JSON object,
// and detects provider-reported errors in the decoded payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use authclient_core::{AuthClientError, Result, UpstreamError};

use crate::token::value_to_string;

/// Declared format of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Detect from the body.
    #[default]
    Auto,
    Json,
    UrlEncoded,
}

impl ContentType {
    /// Classify a `Content-Type` header value.
    ///
    /// Providers routinely answer `text/html` or `text/plain` for JSON and
    /// form bodies, so anything that is not explicitly one of the two is `Auto`.
    pub fn from_header(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Self::Auto;
        };
        let header = header.to_ascii_lowercase();
        if header.contains("json") {
            Self::Json
        } else if header.contains("x-www-form-urlencoded") {
            Self::UrlEncoded
        } else {
            Self::Auto
        }
    }
}

/// Non-standard body encodings a provider is known to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseQuirk {
    #[default]
    None,
    /// `callback( {...} );` around a JSON object.
    CallbackWrappedJson,
}

/// Function name of the callback envelope.
pub const CALLBACK_WRAPPER: &str = "callback";

/// Decodes raw provider bodies into a uniform mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer {
    quirk: ResponseQuirk,
}

impl ResponseNormalizer {
    pub fn new(quirk: ResponseQuirk) -> Self {
        Self { quirk }
    }

    /// Decode `body` declared as `content_type`.
    ///
    /// A declared format that fails to decode falls back to detection before
    /// the body is reported as malformed.
    pub fn decode(&self, body: &str, content_type: ContentType) -> Result<Map<String, Value>> {
        let declared = match content_type {
            ContentType::Json => decode_json(body),
            ContentType::UrlEncoded if looks_form_encoded(body.trim()) => decode_form(body),
            ContentType::UrlEncoded => None,
            ContentType::Auto => None,
        };
        if let Some(map) = declared {
            return Ok(map);
        }
        self.decode_auto(body).ok_or_else(|| {
            AuthClientError::MalformedResponse(format!(
                "unable to decode response body: {}",
                excerpt(body)
            ))
        })
    }

    fn decode_auto(&self, body: &str) -> Option<Map<String, Value>> {
        let trimmed = body.trim();
        if self.quirk == ResponseQuirk::CallbackWrappedJson {
            if let Some(inner) = strip_callback(trimmed) {
                return decode_json(inner);
            }
        }
        if trimmed.starts_with('{') {
            return decode_json(trimmed);
        }
        if looks_form_encoded(trimmed) {
            return decode_form(trimmed);
        }
        None
    }
}

/// Inner text of `callback( ... )`, tolerating whitespace and a trailing `;`.
fn strip_callback(body: &str) -> Option<&str> {
    let rest = body.strip_prefix(CALLBACK_WRAPPER)?.trim_start();
    let rest = rest.strip_prefix('(')?;
    let rest = rest.trim_end().trim_end_matches(';').trim_end();
    let inner = rest.strip_suffix(')')?;
    Some(inner.trim())
}

fn decode_json(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body.trim()).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn decode_form(body: &str) -> Option<Map<String, Value>> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let map: Map<String, Value> = url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// `key=value(&key=value)*` with non-empty keys.
fn looks_form_encoded(body: &str) -> bool {
    !body.is_empty()
        && !body.contains(char::is_whitespace)
        && body.split('&').all(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or_default();
            !key.is_empty() && parts.next().is_some()
        })
}

fn excerpt(body: &str) -> String {
    const MAX: usize = 120;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Find a provider-reported error in a decoded payload.
///
/// A field from `error_fields` signals an error when present with a value
/// other than `null`, `false`, `0`, `"0"` or `""`. QQ's `ret: 0` therefore
/// reads as success.
pub fn detect_upstream_error(
    payload: &Map<String, Value>,
    error_fields: &[&str],
) -> Option<UpstreamError> {
    let (field, code) = error_fields.iter().find_map(|field| {
        let value = payload.get(*field)?;
        let is_error = match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64() != Some(0.0),
            Value::String(s) => !s.is_empty() && s != "0",
            Value::Array(_) | Value::Object(_) => true,
        };
        is_error.then(|| (*field, value_to_string(value)))
    })?;

    let message = ["error_description", "errmsg", "msg", "error"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("provider reported `{field}`"));

    Some(UpstreamError {
        code,
        message,
        payload: payload.clone(),
    })
}
