//! `ObjectStore`: S3-backed versioned blob storage with a symmetric
//! encryption boundary.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use mds_core::ObjectStorePort;
use mds_common::crypto::{EncryptionService, FernetLikeToken};
use mds_domain::{MdsError, Result};
use tracing::{debug, warn};

/// Versioned S3 object store. `get` is best-effort: any failure (missing
/// key, malformed body, decrypt failure) resolves to an empty JSON object
/// rather than propagating an error, matching the archive's original
/// "absence is just an empty page" contract.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    encryption: Option<EncryptionService>,
}

impl S3ObjectStore {
    /// Builds a client bound to `bucket`. The cipher is constructed once,
    /// from a 32-byte key; `put`/`get` borrow it to build a
    /// [`FernetLikeToken`] envelope per call.
    pub fn new(client: S3Client, bucket: impl Into<String>, encryption_key: Option<[u8; 32]>) -> Result<Self> {
        let encryption = match encryption_key {
            Some(key) => Some(EncryptionService::new(&key).map_err(|e| MdsError::PlatformError(e.to_string()))?),
            None => None,
        };
        Ok(Self { client, bucket: bucket.into(), encryption })
    }
}

#[async_trait]
impl ObjectStorePort for S3ObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, encrypt: bool) -> Result<Option<String>> {
        let body = if encrypt {
            let service = self.encryption.as_ref().ok_or(MdsError::NotInitialized)?;
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_err(|e| MdsError::Internal(e.to_string()))?
                .as_secs();
            FernetLikeToken::new(service)
                .encode(&body, now)
                .map_err(|e| MdsError::PlatformError(e.to_string()))?
                .into_bytes()
        } else {
            body
        };

        let response = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| MdsError::Transport(e.to_string()))?;

        debug!(key, "wrote object");
        Ok(response.version_id().map(str::to_string))
    }

    async fn get(&self, key: &str) -> serde_json::Value {
        match self.get_inner(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "object store read failed, returning empty object");
                serde_json::Value::Object(serde_json::Map::new())
            }
        }
    }

    async fn list_versions(&self, key: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .list_object_versions()
            .bucket(&self.bucket)
            .prefix(key)
            .send()
            .await
            .map_err(|e| MdsError::Transport(e.to_string()))?;

        Ok(response
            .versions()
            .iter()
            .filter(|v| v.key() == Some(key))
            .filter_map(|v| v.version_id().map(str::to_string))
            .collect())
    }

    async fn delete_all_versions(&self, key: &str) -> Result<()> {
        for version_id in self.list_versions(key).await? {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .version_id(version_id)
                .send()
                .await
                .map_err(|e| MdsError::Transport(e.to_string()))?;
        }
        Ok(())
    }
}

impl S3ObjectStore {
    async fn get_inner(&self, key: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| MdsError::Transport(e.to_string()))?;

        let bytes =
            response.body.collect().await.map_err(|e| MdsError::Transport(e.to_string()))?.into_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let plaintext = if FernetLikeToken::is_encrypted(&text) {
            let service = self.encryption.as_ref().ok_or(MdsError::NotInitialized)?;
            let decoded =
                FernetLikeToken::new(service).decode(&text).map_err(|e| MdsError::PlatformError(e.to_string()))?;
            String::from_utf8(decoded).map_err(|e| MdsError::ValidationError(e.to_string()))?
        } else {
            text
        };

        serde_json::from_str(&plaintext).map_err(|e| MdsError::ValidationError(e.to_string()))
    }
}
