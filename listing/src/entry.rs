use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names backends use for an object's modification time, in lookup order.
const LAST_MODIFIED_FIELDS: [&str; 3] = ["lastModified", "last_modified", "uploaded"];

/// A single file-like object as reported by the remote listing.
///
/// Only `key` and `size` are decoded into fields. Everything else the backend
/// sends (timestamps, etag, http metadata, storage class, ...) stays in `extra`
/// under its original name and is written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub key: String,
    #[serde(default)]
    pub size: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            extra: Map::new(),
        }
    }

    /// Sets the timestamp under `last_modified`.
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.extra
            .insert("last_modified".to_owned(), Value::String(last_modified.into()));
        self
    }

    /// The raw timestamp, from whichever of `lastModified`, `last_modified` or
    /// `uploaded` is present first.
    pub fn last_modified(&self) -> Option<&str> {
        LAST_MODIFIED_FIELDS
            .iter()
            .find_map(|field| self.extra.get(*field).and_then(Value::as_str))
    }

    /// Milliseconds since the unix epoch, or 0 when the timestamp is missing or
    /// can't be parsed.
    pub fn last_modified_millis(&self) -> i64 {
        self.last_modified()
            .and_then(parse_timestamp_millis)
            .unwrap_or(0)
    }
}

fn parse_timestamp_millis(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .or_else(|_| chrono::DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_passthrough_fields_survive() {
        let raw = json!({
            "key": "a/b.txt",
            "size": 12,
            "etag": "abc",
            "http_metadata": { "contentType": "text/plain" },
            "last_modified": "2024-01-02T03:04:05.000Z",
        });
        let entry: RemoteEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.key, "a/b.txt");
        assert_eq!(entry.size, 12);
        assert_eq!(entry.extra["etag"], "abc");
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn test_timestamp_keeps_its_field_name() {
        for field in LAST_MODIFIED_FIELDS {
            let raw = json!({ "key": "k", "size": 1, field: "1970-01-01T00:00:01Z" });
            let entry: RemoteEntry = serde_json::from_value(raw.clone()).unwrap();

            assert_eq!(entry.last_modified_millis(), 1000, "{field}");
            assert_eq!(serde_json::to_value(&entry).unwrap(), raw, "{field}");
        }
    }

    #[test]
    fn test_several_timestamp_fields() {
        let raw = json!({
            "key": "k",
            "size": 1,
            "uploaded": "1970-01-01T00:00:03Z",
            "last_modified": "Thu, 01 Jan 1970 00:00:02 +0000",
        });
        let entry: RemoteEntry = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(entry.last_modified_millis(), 2000);
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn test_missing_size_is_zero() {
        let entry: RemoteEntry = serde_json::from_value(json!({ "key": "x" })).unwrap();
        assert_eq!(entry.size, 0);
    }

    #[test]
    fn test_bad_or_missing_timestamp_is_zero() {
        assert_eq!(RemoteEntry::new("x", 1).last_modified_millis(), 0);
        assert_eq!(
            RemoteEntry::new("x", 1)
                .with_last_modified("yesterday-ish")
                .last_modified_millis(),
            0
        );
    }
}
