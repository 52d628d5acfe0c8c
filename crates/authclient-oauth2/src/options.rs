// Per-client configuration: credentials plus optional overrides of the
// provider profile.

use serde::{Deserialize, Serialize};

use authclient_core::env::{optional_var, required_var};
use authclient_core::Result;

use crate::profile::ViewOptions;

/// State entries expire after ten minutes unless configured otherwise.
pub const DEFAULT_STATE_TTL_SECS: u64 = 600;

fn default_state_ttl() -> Option<u64> {
    Some(DEFAULT_STATE_TTL_SECS)
}

/// Configuration options for one OAuth2 client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// OAuth client ID (QQ app id, WeChat appid, Weibo app key).
    pub client_id: String,

    /// OAuth client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Requested scope. `None` uses the provider default; an empty string
    /// omits the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Fixed redirect-back URL. Without it the current route is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Replaces the provider's attribute map: local name → remote name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize_user_attribute_map: Option<Vec<(String, String)>>,

    /// Client name; also namespaces the stored state. Defaults to the provider id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_options: Option<ViewOptions>,

    /// Lifetime of a stored auth state in seconds; `None` keeps it for the session.
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: Option<u64>,
}

impl ClientOptions {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            scope: None,
            return_url: None,
            auth_url: None,
            token_url: None,
            api_base_url: None,
            normalize_user_attribute_map: None,
            name: None,
            title: None,
            view_options: None,
            state_ttl_secs: default_state_ttl(),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read `<PREFIX>_CLIENT_ID` (required), `<PREFIX>_CLIENT_SECRET`,
    /// `<PREFIX>_SCOPE` and `<PREFIX>_RETURN_URL`.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let mut options = Self::new(required_var(prefix, "client_id")?);
        options.client_secret = optional_var(prefix, "client_secret");
        options.scope = optional_var(prefix, "scope");
        options.return_url = optional_var(prefix, "return_url");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = ClientOptions::new("cid")
            .with_secret("secret")
            .with_scope("get_user_info,list_album")
            .with_return_url("https://app.test/auth");
        assert_eq!(options.client_id, "cid");
        assert_eq!(options.client_secret.as_deref(), Some("secret"));
        assert_eq!(options.scope.as_deref(), Some("get_user_info,list_album"));
        assert_eq!(options.state_ttl_secs, Some(DEFAULT_STATE_TTL_SECS));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: ClientOptions = serde_json::from_value(serde_json::json!({
            "clientId": "appid",
            "clientSecret": "appkey",
            "viewOptions": { "popupWidth": 640, "popupHeight": 480 },
            "normalizeUserAttributeMap": [["nick", "nickname"]]
        }))
        .unwrap();
        assert_eq!(options.client_id, "appid");
        assert_eq!(options.client_secret.as_deref(), Some("appkey"));
        assert_eq!(options.scope, None);
        assert_eq!(options.view_options.unwrap().popup_width, 640);
        assert_eq!(
            options.normalize_user_attribute_map,
            Some(vec![("nick".to_string(), "nickname".to_string())])
        );
        assert_eq!(options.state_ttl_secs, Some(DEFAULT_STATE_TTL_SECS));
    }

    #[test]
    fn test_from_env_requires_client_id() {
        assert!(ClientOptions::from_env("authclient_options_test_unset").is_err());
    }
}
