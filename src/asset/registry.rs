//! URL path → asset lookup table.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::AssetRecord;

/// Finished mapping from bound URL path to record.
///
/// Built once during the bind phase and read without locks afterwards.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    prefix: String,
    entries: FxHashMap<String, Arc<AssetRecord>>,
    bytes: u64,
}

impl AssetRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Register `record` under `url`.
    ///
    /// An already bound URL is left untouched and `false` is returned.
    pub fn insert(&mut self, url: String, record: AssetRecord) -> bool {
        if self.entries.contains_key(&url) {
            return false;
        }
        self.bytes += record.content().len() as u64;
        self.entries.insert(url, Arc::new(record));
        true
    }

    pub fn get(&self, url: &str) -> Option<&Arc<AssetRecord>> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all `content` lengths.
    pub const fn total_bytes(&self) -> u64 {
        self.bytes
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<AssetRecord>)> {
        self.entries.iter().map(|(url, record)| (url.as_str(), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Hashing;
    use crate::utils::mime::types;

    fn record(body: &str) -> AssetRecord {
        AssetRecord::new(body.as_bytes().to_vec(), types::PLAIN, String::new(), Hashing::Enabled)
    }

    #[test]
    fn test_insert_and_totals() {
        let mut registry = AssetRegistry::new("/static");
        assert!(registry.is_empty());

        assert!(registry.insert("/static/a.txt".into(), record("aaa")));
        assert!(registry.insert("/static/b.txt".into(), record("bb")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.total_bytes(), 5);
        assert_eq!(registry.prefix(), "/static");
        assert!(registry.get("/static/a.txt").is_some());
        assert!(registry.get("/static/c.txt").is_none());
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let mut registry = AssetRegistry::new("");
        assert!(registry.insert("/a.txt".into(), record("first")));
        assert!(!registry.insert("/a.txt".into(), record("second!")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_bytes(), 5);
        assert_eq!(&registry.get("/a.txt").unwrap().content()[..], b"first");
    }
}
