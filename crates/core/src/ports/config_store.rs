//! The `ConfigStore` port: provider profiles and free-form settings.

use async_trait::async_trait;
use mds_domain::{ProviderProfile, Result};

/// Hydrates and serves per-provider configuration and ad hoc settings.
/// Implementations decide the backing (env vars, a TOML file, a secrets
/// manager) and are expected to cache after the first `load`.
#[async_trait]
pub trait ConfigStorePort: Send + Sync {
    /// Loads or refreshes the underlying configuration. Safe to call more
    /// than once; later calls replace the cached snapshot.
    async fn load(&self) -> Result<()>;

    /// Returns the hydrated profile for a named provider.
    async fn provider_profile(&self, name: &str) -> Result<ProviderProfile>;

    /// Returns every provider profile known to this store.
    async fn all_provider_profiles(&self) -> Result<Vec<ProviderProfile>>;

    /// Looks up a free-form setting (Socrata credentials, dataset ids, and
    /// the like) by key, falling back to `default` when absent.
    fn setting(&self, key: &str, default: Option<&str>) -> Option<String>;
}
