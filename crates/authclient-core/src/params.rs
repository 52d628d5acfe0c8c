// Ordered query/form parameters.

use serde::{Deserialize, Serialize};

/// An ordered list of string key/value pairs with unique keys.
///
/// Setting an existing key replaces its value in place, so merging a later
/// set of parameters over an earlier one keeps the earlier ordering while the
/// later values win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    /// Builder-style [`Params::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: &Params) -> &mut Self {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters from a URL's query string. Repeated keys keep the last value.
    pub fn from_query(url: &url::Url) -> Self {
        url.query_pairs().collect()
    }

    /// `application/x-www-form-urlencoded` serialization.
    pub fn to_form_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = Params::from([("a", "1"), ("b", "2")]);
        params.set("a", "3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut defaults = Params::from([("scope", "default"), ("state", "s")]);
        defaults.merge(&Params::from([("scope", "custom"), ("display", "mobile")]));
        assert_eq!(defaults.get("scope"), Some("custom"));
        assert_eq!(defaults.get("display"), Some("mobile"));
        assert_eq!(defaults.len(), 3);
    }

    #[test]
    fn test_from_query_and_form_encoding() {
        let url = url::Url::parse("https://app.test/cb?code=c%201&state=xyz").unwrap();
        let params = Params::from_query(&url);
        assert_eq!(params.get("code"), Some("c 1"));
        assert_eq!(params.to_form_urlencoded(), "code=c+1&state=xyz");
    }

    #[test]
    fn test_remove() {
        let mut params = Params::from([("code", "c"), ("state", "s")]);
        assert_eq!(params.remove("code").as_deref(), Some("c"));
        assert!(!params.contains_key("code"));
        assert_eq!(params.remove("missing"), None);
    }
}
