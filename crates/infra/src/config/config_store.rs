//! `ConfigStore`: hydrates provider profiles and free-form settings from two
//! JSON blobs kept in the object store, which may themselves be encrypted.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mds_core::ConfigStorePort;
use mds_domain::{MdsError, ProviderProfile, Result};

struct Loaded {
    providers: HashMap<String, ProviderProfile>,
    settings: HashMap<String, String>,
}

/// Object-store-backed `ConfigStore`. Caches the hydrated providers/settings
/// maps in memory after the first successful `load`.
pub struct ObjectStoreConfigStore {
    object_store: Arc<dyn mds_core::ObjectStorePort>,
    providers_key: String,
    settings_key: String,
    loaded: RwLock<Option<Loaded>>,
}

impl ObjectStoreConfigStore {
    pub fn new(
        object_store: Arc<dyn mds_core::ObjectStorePort>,
        providers_key: impl Into<String>,
        settings_key: impl Into<String>,
    ) -> Self {
        Self {
            object_store,
            providers_key: providers_key.into(),
            settings_key: settings_key.into(),
            loaded: RwLock::new(None),
        }
    }
}

#[async_trait]
impl ConfigStorePort for ObjectStoreConfigStore {
    async fn load(&self) -> Result<()> {
        let providers_blob = self.object_store.get(&self.providers_key).await;
        let providers_list: Vec<ProviderProfile> = serde_json::from_value(providers_blob)
            .map_err(|e| MdsError::ConfigMissing(format!("malformed providers blob: {e}")))?;
        let providers = providers_list.into_iter().map(|p| (p.name.clone(), p)).collect();

        let settings_blob = self.object_store.get(&self.settings_key).await;
        let settings: HashMap<String, String> = match settings_blob {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())))
                .collect(),
            _ => HashMap::new(),
        };

        let mut guard = self.loaded.write().map_err(|_| MdsError::Internal("config store lock poisoned".into()))?;
        *guard = Some(Loaded { providers, settings });
        Ok(())
    }

    async fn provider_profile(&self, name: &str) -> Result<ProviderProfile> {
        let guard = self.loaded.read().map_err(|_| MdsError::Internal("config store lock poisoned".into()))?;
        let loaded = guard.as_ref().ok_or_else(|| MdsError::NotInitialized)?;
        loaded.providers.get(name).cloned().ok_or_else(|| MdsError::ConfigMissing(format!("unknown provider: {name}")))
    }

    async fn all_provider_profiles(&self) -> Result<Vec<ProviderProfile>> {
        let guard = self.loaded.read().map_err(|_| MdsError::Internal("config store lock poisoned".into()))?;
        let loaded = guard.as_ref().ok_or_else(|| MdsError::NotInitialized)?;
        Ok(loaded.providers.values().cloned().collect())
    }

    fn setting(&self, key: &str, default: Option<&str>) -> Option<String> {
        let guard = self.loaded.read().ok()?;
        let loaded = guard.as_ref()?;
        loaded.settings.get(key).cloned().or_else(|| default.map(str::to_string))
    }
}
