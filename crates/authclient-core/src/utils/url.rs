// URL helpers: composing provider URLs and deriving the redirect-back URL.

use url::Url;

use crate::error::{AuthClientError, Result};
use crate::params::Params;

/// Query parameters the provider appends to the redirect-back request.
pub const CALLBACK_PARAMS: &[&str] = &["code", "state"];

/// Merge `params` into the query string of `base`.
///
/// Parameters already present on `base` keep their position; on a key
/// collision the value from `params` wins. Keys and values are
/// percent-encoded with standard form encoding.
pub fn compose_url(base: &str, params: &Params) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let mut merged = Params::from_query(&url);
    merged.merge(params);

    if merged.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(merged.iter());
    }
    Ok(url)
}

/// The URL the provider should redirect back to: `current` without the
/// callback parameters of a previous round trip.
pub fn return_url_from(current: &Url) -> Url {
    let mut params = Params::from_query(current);
    for key in CALLBACK_PARAMS {
        params.remove(key);
    }
    let mut url = current.clone();
    url.set_fragment(None);
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params.iter());
    }
    url
}

/// Resolves the absolute URL of the route handling the current request.
///
/// Provided by the host framework's routing layer.
pub trait RouteResolver: Send + Sync {
    fn current_url(&self) -> Result<Url>;
}

/// A [`RouteResolver`] that always answers with the same URL.
#[derive(Debug, Clone)]
pub struct FixedRoute(Url);

impl FixedRoute {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self(Url::parse(url)?))
    }
}

impl RouteResolver for FixedRoute {
    fn current_url(&self) -> Result<Url> {
        Ok(self.0.clone())
    }
}

impl<F> RouteResolver for F
where
    F: Fn() -> std::result::Result<Url, String> + Send + Sync,
{
    fn current_url(&self) -> Result<Url> {
        self().map_err(AuthClientError::Config)
    }
}
