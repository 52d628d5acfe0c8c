// Normalized user attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::token::value_to_string;

/// Attribute every normalized result carries.
pub const ID_ATTRIBUTE: &str = "id";

/// User attributes after normalization. Always holds a non-empty string `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAttributes(Map<String, Value>);

impl UserAttributes {
    /// Only `normalize_attributes` builds these, so `id` is always present.
    pub(crate) fn from_normalized(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn id(&self) -> &str {
        self.0
            .get(ID_ATTRIBUTE)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Look up a dotted path such as `data.user.id`.
pub fn extract_path<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = data.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

/// Copy remote fields onto local names, then make sure `id` is a non-empty
/// string, falling back to `fallback_id`.
///
/// Remote fields are kept alongside their local aliases. Returns `None` when
/// no identifier can be found.
pub fn normalize_attributes<'m>(
    mut raw: Map<String, Value>,
    attribute_map: impl IntoIterator<Item = (&'m str, &'m str)>,
    fallback_id: Option<String>,
) -> Option<UserAttributes> {
    let mapped: Vec<(String, Value)> = attribute_map
        .into_iter()
        .filter_map(|(local, remote)| {
            extract_path(&raw, remote).map(|v| (local.to_string(), v.clone()))
        })
        .collect();
    for (local, value) in mapped {
        raw.insert(local, value);
    }

    let id = raw
        .get(ID_ATTRIBUTE)
        .and_then(value_to_string)
        .filter(|id| !id.is_empty())
        .or(fallback_id.filter(|id| !id.is_empty()))?;
    raw.insert(ID_ATTRIBUTE.to_string(), Value::String(id));

    Some(UserAttributes::from_normalized(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_MAP: [(&str, &str); 0] = [];

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_extract_nested_path() {
        let data = map(serde_json::json!({ "data": { "user": { "open_id": "12345" } } }));
        assert_eq!(
            extract_path(&data, "data.user.open_id"),
            Some(&Value::String("12345".into()))
        );
        assert_eq!(extract_path(&data, "data.missing"), None);
    }

    #[test]
    fn test_attribute_map_copies_fields() {
        let raw = map(serde_json::json!({ "openid": "OPENID", "nickname": "Nick" }));
        let attrs = normalize_attributes(raw, [("id", "openid"), ("username", "nickname")], None).unwrap();
        assert_eq!(attrs.id(), "OPENID");
        assert_eq!(attrs.get_str("username"), Some("Nick"));
        assert_eq!(attrs.get_str("nickname"), Some("Nick"));
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let raw = map(serde_json::json!({ "id": 1404376560, "name": "zaku" }));
        let attrs = normalize_attributes(raw, [("username", "name")], None).unwrap();
        assert_eq!(attrs.id(), "1404376560");
        assert_eq!(attrs.get("id"), Some(&Value::String("1404376560".into())));
    }

    #[test]
    fn test_fallback_id() {
        let raw = map(serde_json::json!({ "nickname": "Nick" }));
        let attrs = normalize_attributes(raw, NO_MAP, Some("OPENID".into())).unwrap();
        assert_eq!(attrs.id(), "OPENID");
    }

    #[test]
    fn test_missing_id_yields_none() {
        let raw = map(serde_json::json!({ "id": "", "nickname": "Nick" }));
        assert!(normalize_attributes(raw, NO_MAP, None).is_none());

        let raw = map(serde_json::json!({ "nickname": "Nick" }));
        assert!(normalize_attributes(raw, NO_MAP, Some(String::new())).is_none());
    }

    #[test]
    fn test_unmatched_remote_name_is_skipped() {
        let raw = map(serde_json::json!({ "id": "1" }));
        let attrs = normalize_attributes(raw, [("username", "screen_name")], None).unwrap();
        assert!(attrs.get("username").is_none());
    }
}
