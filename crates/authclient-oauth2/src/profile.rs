// Provider profile: the declarative description of one OAuth2 provider.
//
// A single AuthClient drives every provider; everything provider-specific
// (endpoints, parameter names, user-info lookup, response quirks) is data here.

use serde::Serialize;

use crate::response::ResponseQuirk;
use crate::transport::HttpMethod;

/// How client credentials reach the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AuthenticationMethod {
    /// Send credentials as HTTP Basic auth header.
    Basic,
    /// Send credentials in the POST body (default).
    #[default]
    Post,
}

/// How the access token is attached to API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApiAuth {
    /// As a request parameter (query for GET, body for POST).
    Param(&'static str),
    /// As `Authorization: Bearer <token>`.
    BearerHeader,
}

/// Names the provider uses for the client credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamNames {
    pub client_id: &'static str,
    pub client_secret: &'static str,
}

pub const STANDARD_PARAM_NAMES: ParamNames = ParamNames {
    client_id: "client_id",
    client_secret: "client_secret",
};

/// One API call: a path relative to the API base URL, and its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiCall {
    pub path: &'static str,
    pub method: HttpMethod,
}

impl ApiCall {
    pub const fn get(path: &'static str) -> Self {
        Self {
            path,
            method: HttpMethod::Get,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            path,
            method: HttpMethod::Post,
        }
    }
}

/// How user attributes are fetched once a token is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UserInfoStrategy {
    /// One call returns the full profile.
    SingleCall(ApiCall),
    /// Resolve an internal identifier first, then fetch the profile keyed by it.
    TwoStep {
        lookup: ApiCall,
        /// Field of the lookup response holding the user identifier.
        id_field: &'static str,
        profile: ApiCall,
        /// `(request parameter, lookup response field)` pairs sent with the
        /// profile call.
        forward: &'static [(&'static str, &'static str)],
    },
}

/// Presentation hints for the host's login popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    pub popup_width: u32,
    pub popup_height: u32,
}

/// Static configuration for one provider.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProviderProfile {
    pub id: &'static str,
    pub title: &'static str,
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub api_base_url: &'static str,
    /// Applied only when the client configures no scope of its own.
    pub default_scope: &'static str,
    /// `(local name, remote name)`; remote names may be dotted paths.
    pub attribute_map: &'static [(&'static str, &'static str)],
    pub response_quirk: ResponseQuirk,
    pub user_info: UserInfoStrategy,
    pub param_names: ParamNames,
    /// Whether the token request repeats `redirect_uri`.
    pub exchange_redirect_uri: bool,
    pub auth_method: AuthenticationMethod,
    pub api_auth: ApiAuth,
    /// Token parameters sent along with every API call (e.g. `openid`).
    pub api_token_params: &'static [&'static str],
    /// Token parameter that identifies the user when a `SingleCall` profile
    /// response lacks `id`. `TwoStep` strategies use the lookup identifier.
    pub token_id_param: Option<&'static str>,
    /// Payload fields that signal a provider error.
    pub error_fields: &'static [&'static str],
    pub view_options: ViewOptions,
}
