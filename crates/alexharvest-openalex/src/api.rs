//! OpenAlex list-response envelope and lenient decoding helpers

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One page of a list endpoint (`/authors`, `/works`)
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "lenient_rows")]
    pub results: Vec<T>,
    #[serde(default, deserialize_with = "null_default")]
    pub meta: PageMeta,
}

/// Pagination metadata
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    /// Total matches for the query
    pub count: Option<u64>,
    /// Cursor for the following page (cursor paging)
    pub next_cursor: Option<String>,
    /// Fully formed URL of the following page, when the API provides one
    pub next: Option<String>,
}

impl PageMeta {
    /// Next cursor, treating an empty string as absent
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }

    /// Next-page URL, treating an empty string as absent
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|u| !u.is_empty())
    }
}

/// `null` decodes to `T::default()` instead of failing
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each result on its own; a malformed entry is skipped, not fatal.
fn lenient_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(row) => Some(row),
            Err(e) => {
                log::warn!("skipping malformed result: {e}");
                None
            }
        })
        .collect())
}

/// Elements of a JSON array, or nothing when the value is not an array.
fn array_elements<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            log::debug!("expected an array, got {other}");
            Vec::new()
        }
    })
}

/// Array whose malformed elements (including `null`) are skipped
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(array_elements(deserializer)?
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

/// Array whose malformed elements decode to `T::default()`, keeping the length
pub(crate) fn defaulting_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(array_elements(deserializer)?
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}

/// Optional value that decodes to `None` when it has the wrong shape
pub(crate) fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        log::debug!("ignoring malformed field: {e}");
        None
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    #[test]
    fn page_with_cursor() {
        let body = r#"{"meta": {"count": 2, "next_cursor": "abc"},
            "results": [{"id": "W1"}, {"id": "W2"}]}"#;
        let page: Page<Row> = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.meta.count, Some(2));
        assert_eq!(page.meta.next_cursor(), Some("abc"));
        assert_eq!(page.meta.next_url(), None);
    }

    #[test]
    fn missing_and_null_envelope_fields() {
        let page: Page<Row> = serde_json::from_str(r#"{"results": null, "meta": null}"#).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.meta, PageMeta::default());

        let page: Page<Row> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn empty_cursor_is_absent() {
        let meta = PageMeta {
            next_cursor: Some(String::new()),
            next: Some(String::new()),
            count: None,
        };
        assert_eq!(meta.next_cursor(), None);
        assert_eq!(meta.next_url(), None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let body = r#"{"results": [{"id": "W1"}, {"id": 7}, {"id": "W3"}]}"#;
        let page: Page<Row> = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = page.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["W1", "W3"]);
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Nested {
        #[serde(default, deserialize_with = "lenient_seq")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "defaulting_seq")]
        rows: Vec<Option<u32>>,
        #[serde(default, deserialize_with = "lenient_opt")]
        flag: Option<bool>,
    }

    #[test]
    fn lenient_nested_fields() {
        let nested: Nested = serde_json::from_str(
            r#"{"names": [null, "Doha", 3, "Rayyan"], "rows": [1, "x", null], "flag": "yes"}"#,
        )
        .unwrap();
        assert_eq!(nested.names, ["Doha", "Rayyan"]);
        assert_eq!(nested.rows, [Some(1), None, None]);
        assert_eq!(nested.flag, None);

        let nested: Nested =
            serde_json::from_str(r#"{"names": "Doha", "rows": null, "flag": true}"#).unwrap();
        assert!(nested.names.is_empty());
        assert!(nested.rows.is_empty());
        assert_eq!(nested.flag, Some(true));
    }
}
