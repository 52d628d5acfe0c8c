// OAuth2 access token: the access token value plus every parameter the
// provider returned with it (refresh_token, expires_in, openid, uid, ...).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use authclient_core::{AuthClientError, Result};

/// Parameter holding the access token value.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";
/// Parameter holding the lifetime in seconds.
pub const EXPIRES_IN_PARAM: &str = "expires_in";

/// An access token obtained from one successful code exchange.
///
/// Immutable: a refreshed token is a new `Token`. The caller owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    value: String,
    params: Map<String, Value>,
    created_at: DateTime<Utc>,
}

impl Token {
    /// Build a token from a decoded token response.
    ///
    /// Fails with `MalformedResponse` when `access_token` is missing or empty.
    pub fn from_params(params: Map<String, Value>) -> Result<Self> {
        let value = params
            .get(ACCESS_TOKEN_PARAM)
            .and_then(value_to_string)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AuthClientError::MalformedResponse("token response has no access_token".into())
            })?;

        Ok(Self {
            value,
            params,
            created_at: Utc::now(),
        })
    }

    /// The access token value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// A parameter as a string; numbers and booleans are stringified.
    pub fn param_str(&self, key: &str) -> Option<String> {
        self.params.get(key).and_then(value_to_string)
    }

    pub fn token_type(&self) -> Option<String> {
        self.param_str("token_type")
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.param_str("refresh_token")
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Lifetime in seconds. Form-encoded responses carry it as a string.
    pub fn expires_in(&self) -> Option<i64> {
        match self.params.get(EXPIRES_IN_PARAM)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `None` without an expiry, or when the lifetime runs past the
    /// representable date range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(self.expires_in()?)?;
        self.created_at.checked_add_signed(lifetime)
    }

    /// Tokens without an expiry never report expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }
}

/// Stringify scalar JSON values; objects, arrays and null yield `None`.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
