//! Plain data carried between the widget's components.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// One selectable record returned by the endpoint.
///
/// Only `id` and `name` are interpreted. Every other field lands in `extra`
/// and is handed back to the host untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_id"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// An option that can only be told apart from others by its full contents.
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Identity used for de-duplication and for filtering selected options out
    /// of result pages: ids when both sides have one, structural equality
    /// otherwise.
    pub fn same_identity(&self, other: &SelectOption) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// String value of an extra field, if it is a JSON string or number.
    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "option id must be a string or number, got {other}"
        ))),
    }
}

/// A lookup for one page of results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub text: String,
    /// Zero-based; page 0 is a fresh search.
    pub page: u32,
}

impl Query {
    pub fn new(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            page,
        }
    }

    pub fn first_page(text: impl Into<String>) -> Self {
        Self::new(text, 0)
    }

    /// The page after this one, for the same text.
    pub fn next(&self) -> Self {
        Self::new(self.text.clone(), self.page.saturating_add(1))
    }

    /// Canonical cache key: `text + "_" + page`.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.text, self.page)
    }

    /// `endpoint` + url-encoded text, plus `&page=n` past the first page.
    pub fn url(&self, endpoint: &str) -> String {
        let mut url = format!("{endpoint}{}", urlencoding::encode(&self.text));
        if self.page > 0 {
            url.push_str(&format!("&page={}", self.page));
        }
        url
    }
}

/// Items for one page plus whether the query has been exhausted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
    pub items: Vec<SelectOption>,
    pub complete: bool,
}

impl ResultPage {
    pub fn new(items: Vec<SelectOption>, complete: bool) -> Self {
        Self { items, complete }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn numeric_ids_are_canonicalized_to_strings() {
        let opt: SelectOption =
            serde_json::from_value(json!({"id": 42, "name": "Kigali", "level": 2})).unwrap();
        assert_eq!(Some("42".to_string()), opt.id);
        assert_eq!("Kigali", opt.name);
        assert_eq!(Some(&json!(2)), opt.extra.get("level"));
    }

    #[test]
    fn extra_fields_round_trip() {
        let raw = json!({"id": "a", "name": "Alpha", "urn": "tel:+250", "count": 3});
        let opt: SelectOption = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(raw, serde_json::to_value(&opt).unwrap());
    }

    #[test]
    fn rejects_structured_ids() {
        let err = serde_json::from_value::<SelectOption>(json!({"id": {"x": 1}, "name": "bad"}));
        assert!(err.is_err());
    }

    #[test]
    fn identity_prefers_ids() {
        let a = SelectOption::new("1", "One");
        let renamed = SelectOption::new("1", "Uno");
        assert!(a.same_identity(&renamed));
        assert!(!a.same_identity(&SelectOption::new("2", "One")));
    }

    #[test]
    fn identity_without_ids_is_structural() {
        let a = SelectOption::anonymous("Blue").with_field("hex", json!("#00f"));
        let same = SelectOption::anonymous("Blue").with_field("hex", json!("#00f"));
        let other = SelectOption::anonymous("Blue").with_field("hex", json!("#00e"));
        assert!(a.same_identity(&same));
        assert!(!a.same_identity(&other));
    }

    #[test]
    fn cache_key_and_url() {
        let q = Query::new("ann marie", 0);
        assert_eq!("ann marie_0", q.cache_key());
        assert_eq!("/contacts?search=ann%20marie", q.url("/contacts?search="));

        let next = q.next();
        assert_eq!("ann marie_1", next.cache_key());
        assert_eq!("/contacts?search=ann%20marie&page=1", next.url("/contacts?search="));
    }
}
