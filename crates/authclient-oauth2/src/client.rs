// OAuth2 authorization-code client.
//
// One `AuthClient` drives the whole flow for any provider profile:
//
//   Idle → AuthUrlBuilt → AwaitingCallback → TokenExchanged → AttributesFetched
//
// Any failure moves the flow to `Failed`; nothing is retried. Between calls the
// client holds no per-user state; the session's StateStore and current route
// are passed in explicitly through `FlowSession`.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use authclient_core::{
    compose_url, return_url_from, AuthClientError, Params, Result, RouteResolver, StateStore,
    UpstreamError,
};

use crate::attributes::{normalize_attributes, UserAttributes};
use crate::options::ClientOptions;
use crate::profile::{ApiAuth, AuthenticationMethod, ProviderProfile, UserInfoStrategy, ViewOptions};
use crate::response::{detect_upstream_error, ContentType, ResponseNormalizer};
use crate::state::{consume_auth_state, generate_auth_state, state_storage_key, store_auth_state};
use crate::token::{value_to_string, Token};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};

/// Stage of an authorization flow, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    AuthUrlBuilt,
    AwaitingCallback,
    TokenExchanged,
    AttributesFetched,
    Failed,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AuthUrlBuilt => "auth_url_built",
            Self::AwaitingCallback => "awaiting_callback",
            Self::TokenExchanged => "token_exchanged",
            Self::AttributesFetched => "attributes_fetched",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Host collaborators for the current user session.
#[derive(Clone, Copy)]
pub struct FlowSession<'a> {
    /// State store of the current user session.
    pub store: &'a dyn StateStore,
    /// Resolves the route handling the current request.
    pub route: &'a dyn RouteResolver,
}

impl<'a> FlowSession<'a> {
    pub fn new(store: &'a dyn StateStore, route: &'a dyn RouteResolver) -> Self {
        Self { store, route }
    }
}

/// Result of a completed flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated {
    pub token: Token,
    pub attributes: UserAttributes,
}

/// An OAuth2 client for one provider profile and one set of credentials.
#[derive(Debug, Clone)]
pub struct AuthClient {
    profile: &'static ProviderProfile,
    options: ClientOptions,
    transport: Arc<dyn HttpTransport>,
    normalizer: ResponseNormalizer,
}

impl AuthClient {
    pub fn new(
        profile: &'static ProviderProfile,
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            profile,
            options,
            transport,
            normalizer: ResponseNormalizer::new(profile.response_quirk),
        }
    }

    /// Client backed by a default `reqwest::Client`.
    pub fn with_reqwest(profile: &'static ProviderProfile, options: ClientOptions) -> Self {
        Self::new(profile, options, Arc::new(ReqwestTransport::default()))
    }

    pub fn profile(&self) -> &'static ProviderProfile {
        self.profile
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Client name; defaults to the provider id.
    pub fn name(&self) -> &str {
        self.options.name.as_deref().unwrap_or(self.profile.id)
    }

    pub fn title(&self) -> &str {
        self.options.title.as_deref().unwrap_or(self.profile.title)
    }

    pub fn view_options(&self) -> ViewOptions {
        self.options.view_options.unwrap_or(self.profile.view_options)
    }

    pub fn auth_url(&self) -> &str {
        self.options.auth_url.as_deref().unwrap_or(self.profile.authorize_url)
    }

    pub fn token_url(&self) -> &str {
        self.options.token_url.as_deref().unwrap_or(self.profile.token_url)
    }

    pub fn api_base_url(&self) -> &str {
        self.options
            .api_base_url
            .as_deref()
            .unwrap_or(self.profile.api_base_url)
    }

    /// Configured scope, or the provider default when none is configured.
    pub fn scope(&self) -> &str {
        self.options.scope.as_deref().unwrap_or(self.profile.default_scope)
    }

    /// Key under which this client keeps its auth state.
    pub fn state_key(&self) -> String {
        state_storage_key(self.name())
    }

    /// The redirect-back URL registered with the provider.
    pub fn return_url(&self, route: &dyn RouteResolver) -> Result<Url> {
        match &self.options.return_url {
            Some(url) => Ok(Url::parse(url)?),
            None => Ok(return_url_from(&route.current_url()?)),
        }
    }

    /// Build the authorization URL and store a fresh state for the session.
    ///
    /// `extra` wins over the default parameters on key collision.
    pub async fn build_auth_url(&self, session: &FlowSession<'_>, extra: &Params) -> Result<Url> {
        let result = self.build_auth_url_inner(session, extra).await;
        match &result {
            Ok(_) => debug!(provider = self.name(), stage = %FlowStage::AuthUrlBuilt, "authorization URL built"),
            Err(e) => self.log_failure(FlowStage::Idle, e),
        }
        result
    }

    async fn build_auth_url_inner(&self, session: &FlowSession<'_>, extra: &Params) -> Result<Url> {
        let return_url = self.return_url(session.route)?;
        let state = generate_auth_state();

        let mut params = Params::new();
        params
            .set(self.profile.param_names.client_id, self.options.client_id.as_str())
            .set("response_type", "code")
            .set("redirect_uri", return_url.as_str())
            .set("state", state.as_str());
        let scope = self.scope();
        if !scope.is_empty() {
            params.set("scope", scope);
        }
        params.merge(extra);

        let url = compose_url(self.auth_url(), &params)?;
        store_auth_state(session.store, self.name(), &state, self.options.state_ttl_secs).await?;
        Ok(url)
    }

    /// Validate the callback state and exchange `auth_code` for a token.
    ///
    /// The stored state is consumed only when it matches `callback["state"]`;
    /// a mismatch leaves it in place and fails with `InvalidAuthState`.
    pub async fn fetch_access_token(
        &self,
        session: &FlowSession<'_>,
        auth_code: &str,
        callback: &Params,
        extra: &Params,
    ) -> Result<Token> {
        let result = self
            .fetch_access_token_inner(session, auth_code, callback, extra)
            .await;
        match &result {
            Ok(_) => debug!(provider = self.name(), stage = %FlowStage::TokenExchanged, "access token obtained"),
            Err(e) => self.log_failure(FlowStage::AwaitingCallback, e),
        }
        result
    }

    async fn fetch_access_token_inner(
        &self,
        session: &FlowSession<'_>,
        auth_code: &str,
        callback: &Params,
        extra: &Params,
    ) -> Result<Token> {
        consume_auth_state(session.store, self.name(), callback.get("state")).await?;

        let names = self.profile.param_names;
        let mut params = Params::new();
        let mut headers = Vec::new();
        match self.profile.auth_method {
            AuthenticationMethod::Post => {
                params.set(names.client_id, self.options.client_id.as_str());
                if let Some(secret) = &self.options.client_secret {
                    params.set(names.client_secret, secret.as_str());
                }
            }
            AuthenticationMethod::Basic => {
                // RFC 7617: base64(client_id:client_secret)
                let credentials = format!(
                    "{}:{}",
                    self.options.client_id,
                    self.options.client_secret.as_deref().unwrap_or("")
                );
                let encoded = STANDARD.encode(credentials.as_bytes());
                headers.push(("Authorization".to_string(), format!("Basic {encoded}")));
            }
        }
        params
            .set("code", auth_code)
            .set("grant_type", "authorization_code");
        if self.profile.exchange_redirect_uri {
            params.set("redirect_uri", self.return_url(session.route)?.as_str());
        }
        params.merge(extra);

        let payload = self
            .send_request(HttpMethod::Post, self.token_url(), params, headers)
            .await?;
        self.check_upstream(&payload)?;
        Token::from_params(payload)
    }

    /// Fetch and normalize the user's attributes with `token`.
    pub async fn fetch_user_attributes(&self, token: &Token) -> Result<UserAttributes> {
        let result = self.fetch_user_attributes_inner(token).await;
        match &result {
            Ok(_) => debug!(provider = self.name(), stage = %FlowStage::AttributesFetched, "user attributes fetched"),
            Err(e) => self.log_failure(FlowStage::TokenExchanged, e),
        }
        result
    }

    async fn fetch_user_attributes_inner(&self, token: &Token) -> Result<UserAttributes> {
        let (raw, fallback_id) = match self.profile.user_info {
            UserInfoStrategy::SingleCall(call) => {
                let raw = self.api(token, call.path, call.method, &Params::new()).await?;
                let fallback = self.profile.token_id_param.and_then(|p| token.param_str(p));
                (raw, fallback)
            }
            UserInfoStrategy::TwoStep {
                lookup,
                id_field,
                profile,
                forward,
            } => {
                let identity = self.api(token, lookup.path, lookup.method, &Params::new()).await?;
                let id = lookup_field(&identity, id_field)?;

                let mut params = Params::new();
                for (param, field) in forward {
                    params.set(*param, lookup_field(&identity, field)?);
                }
                let raw = self.api(token, profile.path, profile.method, &params).await?;
                (raw, Some(id))
            }
        };

        let attributes = match &self.options.normalize_user_attribute_map {
            Some(map) => normalize_attributes(
                raw,
                map.iter().map(|(local, remote)| (local.as_str(), remote.as_str())),
                fallback_id,
            ),
            None => normalize_attributes(raw, self.profile.attribute_map.iter().copied(), fallback_id),
        };
        attributes.ok_or_else(|| {
            AuthClientError::MalformedResponse("user attributes carry no identifier".into())
        })
    }

    /// Call a provider API with `token`.
    ///
    /// Relative paths resolve against the API base URL. GET parameters go to
    /// the query string, POST parameters to a form body.
    pub async fn api(
        &self,
        token: &Token,
        path: &str,
        method: HttpMethod,
        params: &Params,
    ) -> Result<Map<String, Value>> {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.api_base_url().trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut params = params.clone();
        let mut headers = Vec::new();
        match self.profile.api_auth {
            ApiAuth::Param(name) => {
                params.set(name, token.value());
            }
            ApiAuth::BearerHeader => {
                headers.push(("Authorization".to_string(), format!("Bearer {}", token.value())));
            }
        }
        for name in self.profile.api_token_params {
            if let Some(value) = token.param_str(name) {
                params.set(*name, value);
            }
        }

        let payload = self.send_request(method, &url, params, headers).await?;
        self.check_upstream(&payload)?;
        Ok(payload)
    }

    /// Complete a flow from the redirect-back request's query parameters.
    pub async fn authenticate(
        &self,
        session: &FlowSession<'_>,
        callback: &Params,
        extra: &Params,
    ) -> Result<Authenticated> {
        if let Some(error) = callback.get("error") {
            let message = callback.get("error_description").unwrap_or(error);
            let err = AuthClientError::from(UpstreamError::new(message).with_code(error));
            self.log_failure(FlowStage::AwaitingCallback, &err);
            return Err(err);
        }
        let Some(code) = callback.get("code").filter(|c| !c.is_empty()) else {
            let err = AuthClientError::from(UpstreamError::new("missing authorization code"));
            self.log_failure(FlowStage::AwaitingCallback, &err);
            return Err(err);
        };

        let token = self.fetch_access_token(session, code, callback, extra).await?;
        let attributes = self.fetch_user_attributes(&token).await?;
        Ok(Authenticated { token, attributes })
    }

    async fn send_request(
        &self,
        method: HttpMethod,
        url: &str,
        params: Params,
        mut headers: Vec<(String, String)>,
    ) -> Result<Map<String, Value>> {
        let (url, form) = match method {
            HttpMethod::Get => (compose_url(url, &params)?, None),
            HttpMethod::Post => (Url::parse(url)?, Some(params)),
        };
        headers.push(("Accept".to_string(), "application/json".to_string()));

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                form,
            })
            .await?;

        if !response.is_success() {
            return Err(AuthClientError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }

        self.normalizer.decode(
            &response.body,
            ContentType::from_header(response.content_type.as_deref()),
        )
    }

    fn check_upstream(&self, payload: &Map<String, Value>) -> Result<()> {
        match detect_upstream_error(payload, self.profile.error_fields) {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn log_failure(&self, from: FlowStage, err: &AuthClientError) {
        warn!(
            provider = self.name(),
            stage = %FlowStage::Failed,
            from = %from,
            kind = %err.kind(),
            error = %err,
            "authorization flow failed"
        );
    }
}

fn lookup_field(payload: &Map<String, Value>, field: &str) -> Result<String> {
    payload
        .get(field)
        .and_then(value_to_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AuthClientError::MalformedResponse(format!("identity lookup response has no `{field}`"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{QQ, WECHAT, WEIBO};

    fn client(profile: &'static ProviderProfile, options: ClientOptions) -> AuthClient {
        AuthClient::with_reqwest(profile, options)
    }

    #[test]
    fn test_flow_stage_display() {
        assert_eq!(FlowStage::AuthUrlBuilt.to_string(), "auth_url_built");
        assert_eq!(FlowStage::Failed.to_string(), "failed");
    }

    #[test]
    fn test_default_scope_applies_only_without_configured_scope() {
        assert_eq!(client(&QQ, ClientOptions::new("cid")).scope(), "get_user_info");
        assert_eq!(
            client(&QQ, ClientOptions::new("cid").with_scope("get_user_info,add_t")).scope(),
            "get_user_info,add_t"
        );
        assert_eq!(client(&WEIBO, ClientOptions::new("cid").with_scope("")).scope(), "");
    }

    #[test]
    fn test_name_title_and_overrides() {
        let mut options = ClientOptions::new("cid").with_name("wx-main");
        options.token_url = Some("https://proxy.test/token".into());
        let wechat = client(&WECHAT, options);
        assert_eq!(wechat.name(), "wx-main");
        assert_eq!(wechat.title(), "WeChat");
        assert_eq!(wechat.token_url(), "https://proxy.test/token");
        assert_eq!(wechat.auth_url(), WECHAT.authorize_url);
        assert_eq!(wechat.state_key(), "oauth2:wx-main:state");
    }

    #[test]
    fn test_return_url_prefers_configured_url() {
        let route = authclient_core::FixedRoute::parse("https://app.test/auth?authclient=qq&code=c&state=s").unwrap();
        let derived = client(&QQ, ClientOptions::new("cid"));
        assert_eq!(
            derived.return_url(&route).unwrap().as_str(),
            "https://app.test/auth?authclient=qq"
        );

        let fixed = client(&QQ, ClientOptions::new("cid").with_return_url("https://app.test/cb"));
        assert_eq!(fixed.return_url(&route).unwrap().as_str(), "https://app.test/cb");
    }

    #[tokio::test]
    async fn test_unbounded_state_ttl_is_accepted() {
        let mut options = ClientOptions::new("cid");
        options.state_ttl_secs = Some(u64::MAX);
        let client = client(&WEIBO, options);
        let store = authclient_core::MemoryStateStore::new();
        let route = authclient_core::FixedRoute::parse("https://app.test/auth").unwrap();

        let url = client
            .build_auth_url(&FlowSession::new(&store, &route), &Params::new())
            .await
            .unwrap();
        let state = Params::from_query(&url).get("state").unwrap().to_string();
        assert_eq!(store.get(&client.state_key()).await.unwrap(), Some(state));
    }

    #[test]
    fn test_lookup_field() {
        let payload = serde_json::json!({ "uid": 1404376560, "openid": "" });
        let payload = payload.as_object().unwrap();
        assert_eq!(lookup_field(payload, "uid").unwrap(), "1404376560");
        assert!(matches!(
            lookup_field(payload, "openid"),
            Err(AuthClientError::MalformedResponse(_))
        ));
    }
}
