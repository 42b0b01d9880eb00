//! Object storage for uploaded media.
//!
//! Objects live under relative keys such as `memories/<uuid>.jpg` and are
//! served from a public base URL. Stores hand out URLs for the keys they hold
//! and can map those URLs back to keys, which is how rows that point at media
//! are matched with stored objects.
//!
//! # Example
//!
//! ```no_run
//! use media_store::{object_key, LocalStore, ObjectStore};
//!
//! # async fn example() -> media_store::Result<()> {
//! let store = LocalStore::new("./media", "/media").await?;
//! let key = object_key(Some("memories"), "beach.jpg");
//! let stored = store.put(&key, b"...".to_vec(), "image/jpeg").await?;
//! assert_eq!(store.key_for_url(&stored.url), Some(key));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod key;
pub mod local;
pub mod memory;

pub use error::{Result, StoreError};
pub use key::{object_key, validate_key};
pub use local::LocalStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Result of storing an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Public URL the object is served from.
    pub url: String,
    pub size_bytes: u64,
}

/// A keyed blob store with public URLs.
///
/// This trait is object-safe and is shared as `Arc<dyn ObjectStore>`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredObject>;

    /// Read an object. Fails with [`StoreError::NotFound`] when missing.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete an object. Returns `false` if there was nothing to delete.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All stored keys, sorted.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Public base URL, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Public URL for `key`.
    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url(), key)
    }

    /// Key behind a URL this store issued. Foreign URLs yield `None`.
    fn key_for_url(&self, url: &str) -> Option<String> {
        let key = url.strip_prefix(self.base_url())?.strip_prefix('/')?;
        let key = key.split(['?', '#']).next().unwrap_or(key);
        validate_key(key).ok()?;
        Some(key.to_string())
    }
}

pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_round_trip() {
        let store = MemoryStore::new("/media/");
        assert_eq!(store.url_for("memories/a.jpg"), "/media/memories/a.jpg");
        assert_eq!(
            store.key_for_url("/media/memories/a.jpg?v=2"),
            Some("memories/a.jpg".to_string())
        );
    }

    #[test]
    fn test_foreign_urls_have_no_key() {
        let store = MemoryStore::new("https://cdn.example.com/media");
        assert_eq!(store.key_for_url("https://example.org/a.jpg"), None);
        assert_eq!(store.key_for_url("https://cdn.example.com/mediafoo/a.jpg"), None);
        assert_eq!(store.key_for_url("https://cdn.example.com/media/../a.jpg"), None);
        assert_eq!(store.key_for_url("https://cdn.example.com/media/"), None);
    }
}
