//! Lenient field deserializers shared by request bodies and import files.
//!
//! Legacy payloads send coordinates as strings, use `""` for missing
//! references and `null` for missing text. These helpers normalize all of
//! that into the typed domain fields.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// Accepts a JSON number, a numeric string, `""` or `null` (the last two map
/// to `T::default()`).
///
/// # Errors
/// Fails when a string does not parse as `T`.
pub fn lenient_number<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + Default,
    T::Err: Display,
{
    match Option::<NumberOrString<T>>::deserialize(d)? {
        None => Ok(T::default()),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(T::default())
            } else {
                s.parse().map_err(de::Error::custom)
            }
        }
    }
}

/// `null` becomes `""`.
///
/// # Errors
/// Fails on non-string values.
pub fn nullable_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// Optional reference id: `null`, `""` and absent all mean "no reference".
///
/// # Errors
/// Fails when a non-empty string is not a UUID.
pub fn optional_uuid<'de, D>(d: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(d)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "lenient_number")]
        lat: f64,
        #[serde(deserialize_with = "lenient_number")]
        count: i32,
        #[serde(deserialize_with = "nullable_string")]
        name: String,
        #[serde(deserialize_with = "optional_uuid")]
        parent: Option<Uuid>,
    }

    fn parse(v: serde_json::Value) -> Result<Sample, serde_json::Error> {
        serde_json::from_value(v)
    }

    #[test]
    fn numbers_accept_strings() {
        let p = parse(serde_json::json!({ "lat": "41.2995", "count": "7" })).unwrap();
        assert!((p.lat - 41.2995).abs() < 1e-9);
        assert_eq!(p.count, 7);
    }

    #[test]
    fn blanks_and_nulls_become_defaults() {
        let p = parse(serde_json::json!({
            "lat": "",
            "count": null,
            "name": null,
            "parent": ""
        }))
        .unwrap();
        assert!(p.lat.abs() < f64::EPSILON);
        assert_eq!(p.count, 0);
        assert_eq!(p.name, "");
        assert!(p.parent.is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse(serde_json::json!({ "lat": "north" })).is_err());
        assert!(parse(serde_json::json!({ "parent": "not-a-uuid" })).is_err());
    }

    #[test]
    fn parses_parent_reference() {
        let id = Uuid::new_v4();
        let p = parse(serde_json::json!({ "parent": id.to_string() })).unwrap();
        assert_eq!(p.parent, Some(id));
    }
}
