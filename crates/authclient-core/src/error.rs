// Error taxonomy for the OAuth2 client flow.
//
// Every failure aborts the current flow step. Nothing here is retried; the
// caller decides whether to restart the whole flow with a fresh state token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state_store::StateStoreError;

/// Coarse classification of an [`AuthClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// State missing or mismatched. The flow must restart.
    InvalidAuthState,
    /// Provider returned a body that no decoding scheme accepts.
    MalformedResponse,
    /// Provider answered, but the payload reports an error.
    UpstreamError,
    /// Network or HTTP-layer failure.
    TransportError,
    /// Client misconfiguration or a failing host collaborator.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidAuthState => "INVALID_AUTH_STATE",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::Configuration => "CONFIGURATION",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status a host should answer with when a flow step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    BadRequest = 400,
    InternalServerError = 500,
    BadGateway = 502,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// Error payload reported by a provider on an otherwise successful HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamError {
    /// Provider error code (`error`, `errcode`, `error_code`, ...), stringified.
    pub code: Option<String>,
    pub message: String,
    /// The decoded response that carried the error.
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthClientError {
    #[error("Invalid auth state parameter.")]
    InvalidAuthState,

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider reported an error: {0}")]
    Upstream(UpstreamError),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    StateStore(#[from] StateStoreError),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<UpstreamError> for AuthClientError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err)
    }
}

impl AuthClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAuthState => ErrorKind::InvalidAuthState,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Upstream(_) => ErrorKind::UpstreamError,
            Self::Transport(_) | Self::HttpStatus { .. } => ErrorKind::TransportError,
            Self::Config(_) | Self::Url(_) | Self::StateStore(_) => ErrorKind::Configuration,
        }
    }

    pub fn http_status(&self) -> HttpStatus {
        match self.kind() {
            ErrorKind::InvalidAuthState | ErrorKind::UpstreamError => HttpStatus::BadRequest,
            ErrorKind::MalformedResponse | ErrorKind::TransportError => HttpStatus::BadGateway,
            ErrorKind::Configuration => HttpStatus::InternalServerError,
        }
    }

    /// JSON body for an error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.kind(),
            "message": self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, AuthClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_is_bad_request() {
        let err = AuthClientError::InvalidAuthState;
        assert_eq!(err.kind(), ErrorKind::InvalidAuthState);
        assert_eq!(err.http_status().status_code(), 400);
        assert_eq!(err.to_string(), "Invalid auth state parameter.");
    }

    #[test]
    fn test_http_status_classifies_as_transport() {
        let err = AuthClientError::HttpStatus {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert_eq!(err.http_status(), HttpStatus::BadGateway);
    }

    #[test]
    fn test_upstream_display_includes_code() {
        let err = UpstreamError::new("invalid openid").with_code("40003");
        assert_eq!(err.to_string(), "[40003] invalid openid");
        assert_eq!(UpstreamError::new("denied").to_string(), "denied");
    }

    #[test]
    fn test_to_json_shape() {
        let err = AuthClientError::MalformedResponse("not json".into());
        let body = err.to_json();
        assert_eq!(body["code"], "MALFORMED_RESPONSE");
        assert!(body["message"].as_str().unwrap().contains("not json"));
    }
}
