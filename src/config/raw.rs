//! Untyped option bag

use std::collections::BTreeMap;

/// Raw configuration as supplied by the caller
///
/// Keys map to an optional string value. A key with no value (`None`) models an
/// option that was named but never given one, e.g. `?keepAlive` in a connection
/// string. The factory reads this once at construction and does not keep it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    entries: BTreeMap<String, Option<String>>,
}

impl RawConfig {
    /// Create an empty option bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option value, replacing any previous value
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), Some(value.into()));
        self
    }

    /// Name an option without giving it a value
    pub fn set_null(mut self, key: impl Into<String>) -> Self {
        self.entries.insert(key.into(), None);
        self
    }

    /// Insert an entry in place
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.insert(key.into(), value);
    }

    /// Look up an option
    ///
    /// Returns `None` when the key is missing and `Some(None)` when the key is
    /// present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries.get(key).map(|v| v.as_deref())
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no options were supplied
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a URL query string (`?a=1&b=2&flag`)
    ///
    /// A pair without `=` is recorded as a key with no value. Empty pairs are
    /// skipped. Later occurrences of a key win.
    pub fn parse_query(query_string: &str) -> Self {
        let mut config = Self::new();
        let query = query_string.trim_start_matches('?');

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            match pair.split_once('=') {
                Some((key, value)) => config.insert(key, Some(value.to_string())),
                None => config.insert(pair, None),
            }
        }
        config
    }
}

impl<K, V> FromIterator<(K, V)> for RawConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), Some(v.into())))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let config = RawConfig::new().set("keepAlive", "true").set_null("keepAliveIdle");
        assert_eq!(config.get("keepAlive"), Some(Some("true")));
        assert_eq!(config.get("keepAliveIdle"), Some(None));
        assert_eq!(config.get("missing"), None);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_parse_query() {
        let config = RawConfig::parse_query("?keepAlive=true&keepAliveIdle=60&sslmode=disable");
        assert_eq!(config.get("keepAlive"), Some(Some("true")));
        assert_eq!(config.get("keepAliveIdle"), Some(Some("60")));
        assert_eq!(config.get("sslmode"), Some(Some("disable")));
    }

    #[test]
    fn test_parse_query_bare_key_has_no_value() {
        let config = RawConfig::parse_query("keepAlive&keepAliveCount=5");
        assert_eq!(config.get("keepAlive"), Some(None));
        assert_eq!(config.get("keepAliveCount"), Some(Some("5")));
    }

    #[test]
    fn test_parse_query_empty() {
        assert!(RawConfig::parse_query("").is_empty());
        assert!(RawConfig::parse_query("?").is_empty());
        assert!(RawConfig::parse_query("&&").is_empty());
    }

    #[test]
    fn test_parse_query_last_value_wins() {
        let config = RawConfig::parse_query("keepAliveIdle=10&keepAliveIdle=20");
        assert_eq!(config.get("keepAliveIdle"), Some(Some("20")));
    }

    #[test]
    fn test_from_iterator() {
        let config: RawConfig = [("keepAlive", "true"), ("keepAliveCount", "3")]
            .into_iter()
            .collect();
        let keys: Vec<&str> = config.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["keepAlive", "keepAliveCount"]);
    }
}
