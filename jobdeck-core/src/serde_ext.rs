//! Serde helpers for identifiers the CI engine sends as either numbers or strings

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl From<NumberOrString> for String {
    fn from(value: NumberOrString) -> Self {
        match value {
            NumberOrString::Unsigned(n) => n.to_string(),
            NumberOrString::Signed(n) => n.to_string(),
            NumberOrString::Text(s) => s,
        }
    }
}

/// Deserialize a JSON number or string into a `String`
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer).map(String::from)
}

/// Like [`string_or_number`], but `null` and a missing field map to an empty string
pub(crate) fn string_or_number_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)
        .map(|value| value.map(String::from).unwrap_or_default())
}

/// Treat an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a list row by row, dropping rows that do not decode
///
/// `null` and a missing field give an empty list.
pub(crate) fn skip_invalid_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "string_or_number")]
        value: String,
        #[serde(default, deserialize_with = "string_or_number_or_empty")]
        other: String,
    }

    #[test]
    fn test_accepts_number_and_string() {
        let probe: Probe = serde_json::from_str(r#"{"value": 42}"#).unwrap();
        assert_eq!(probe.value, "42");
        assert_eq!(probe.other, "");

        let probe: Probe = serde_json::from_str(r#"{"value": "42", "other": null}"#).unwrap();
        assert_eq!(probe.value, "42");
        assert_eq!(probe.other, "");
    }

    #[derive(Deserialize)]
    struct Rows {
        #[serde(default, deserialize_with = "skip_invalid_rows")]
        rows: Vec<u32>,
    }

    #[test]
    fn test_skip_invalid_rows() {
        let parsed: Rows = serde_json::from_str(r#"{"rows": [1, "two", 3, -4]}"#).unwrap();
        assert_eq!(parsed.rows, vec![1, 3]);

        let parsed: Rows = serde_json::from_str(r#"{"rows": null}"#).unwrap();
        assert!(parsed.rows.is_empty());

        let parsed: Rows = serde_json::from_str("{}").unwrap();
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(serde_json::from_str::<Probe>(r#"{"value": [1]}"#).is_err());
    }
}
