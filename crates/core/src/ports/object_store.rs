//! The `ObjectStore` port: the staging/processed blob archive.

use async_trait::async_trait;
use mds_domain::Result;

/// Versioned blob storage for staged and processed trip payloads.
///
/// `get` is intentionally best-effort: a missing key, a malformed body, or a
/// decrypt failure all resolve to `serde_json::Value::Object` empty map
/// rather than an error, matching the archive's original "absence is just an
/// empty page" contract.
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Writes `body` under `key`, optionally encrypting it first. Returns the
    /// backing store's version id for the write, when the backend supports
    /// versioning.
    async fn put(&self, key: &str, body: Vec<u8>, encrypt: bool) -> Result<Option<String>>;

    /// Best-effort read. Never returns `Err`; any failure surfaces as an
    /// empty JSON object.
    async fn get(&self, key: &str) -> serde_json::Value;

    /// Lists every version id recorded for `key`, oldest first.
    async fn list_versions(&self, key: &str) -> Result<Vec<String>>;

    /// Deletes every version of `key`.
    async fn delete_all_versions(&self, key: &str) -> Result<()>;
}
