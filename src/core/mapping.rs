//! Immutable property snapshots.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;
use std::str::FromStr;

/// An immutable snapshot of resolved key/value properties.
///
/// A fresh `Mapping` is produced by every successful reload and published
/// behind an `Arc`; it is never mutated after publication. Iteration order
/// carries no meaning.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::Mapping;
///
/// let mapping: Mapping = [("pool.size", "8")].into_iter().collect();
/// assert_eq!(mapping.get("pool.size"), Some("8"));
/// assert_eq!(mapping.get_parsed::<u32>("pool.size").unwrap(), Some(8));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: HashMap<String, String>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a value and parse it.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the value does not parse as `T`.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ConfigError::Parse(format!("property '{}' = '{}': {}", key, raw, e)))
            })
            .transpose()
    }

    /// Whether the key is present (possibly with an empty value).
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping holds no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all key/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Overlay `other` on top of this mapping; keys in `other` win.
    pub(crate) fn overlay(&mut self, other: HashMap<String, String>) {
        self.entries.extend(other);
    }
}

impl From<HashMap<String, String>> for Mapping {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for Mapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for Mapping {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_later_wins() {
        let mut mapping: Mapping = [("foo", "a"), ("bar", "b")].into_iter().collect();
        mapping.overlay(HashMap::from([("foo".to_string(), "c".to_string())]));

        assert_eq!(mapping.get("foo"), Some("c"));
        assert_eq!(mapping.get("bar"), Some("b"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_get_parsed() {
        let mapping: Mapping = [("port", "8080"), ("host", "localhost")].into_iter().collect();

        assert_eq!(mapping.get_parsed::<u16>("port").unwrap(), Some(8080));
        assert_eq!(mapping.get_parsed::<u16>("missing").unwrap(), None);
        assert!(matches!(
            mapping.get_parsed::<u16>("host"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_value_is_present() {
        let mapping: Mapping = [("empty", "")].into_iter().collect();
        assert!(mapping.contains_key("empty"));
        assert_eq!(mapping.get("empty"), Some(""));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mapping: Mapping = [("foo", "fooval")].into_iter().collect();
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"foo":"fooval"}"#);

        let back: Mapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }
}
