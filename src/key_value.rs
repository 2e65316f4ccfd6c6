//! Ordered key/value property table attached to a volume

use crate::error::NormalizeError;
use crate::error::Result;

/// Owned key/value pairs kept in insertion order
///
/// Order matters: gradient entries are numbered by the position of their
/// key in this table. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueStore {
    pairs: Vec<(String, String)>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pair
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MetadataWrite`] when the key is empty or
    /// either side cannot be serialized on a single `key:=value` line.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        Self::check(&key, &value)?;

        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
        Ok(())
    }

    fn check(key: &str, value: &str) -> Result<()> {
        let reason = if key.is_empty() {
            Some("empty key")
        } else if key.contains(":=") {
            Some("key contains ':='")
        } else if key.contains('\n') || value.contains('\n') {
            Some("embedded newline")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(NormalizeError::MetadataWrite {
                key: key.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueStore {
    /// Collects pairs without validation, later duplicates replace earlier ones
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = KeyValueStore::new();
        for (key, value) in iter {
            let (key, value) = (key.into(), value.into());
            match store.pairs.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = value,
                None => store.pairs.push((key, value)),
            }
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut store = KeyValueStore::new();
        store.insert("b", "1").unwrap();
        store.insert("a", "2").unwrap();
        store.insert("b", "3").unwrap();

        let pairs: Vec<_> = store.iter().collect();
        assert_eq!(pairs, vec![("b", "3"), ("a", "2")]);
        assert_eq!(store.get("a"), Some("2"));
    }

    #[test]
    fn rejects_unwritable_pairs() {
        let mut store = KeyValueStore::new();
        assert!(matches!(
            store.insert("", "x"),
            Err(NormalizeError::MetadataWrite { .. })
        ));
        assert!(store.insert("a:=b", "x").is_err());
        assert!(store.insert("key", "two\nlines").is_err());
        assert!(store.is_empty());
    }
}
