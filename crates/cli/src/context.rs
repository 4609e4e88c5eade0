//! Wires concrete adapters into the port trait objects every command needs.
//!
//! Built once per process invocation rather than as a global singleton, so
//! each command gets an explicitly owned set of dependencies instead of
//! reaching into module-level statics.

use std::sync::Arc;

use chrono_tz::US::Central;
use mds_core::{
    BlockExecutor, ConfigStorePort, GraphQlGatewayPort, ObjectStorePort, ScheduleRepoPort, SocrataSinkPort,
};
use mds_domain::{MdsError, ProviderProfile, Result};
use mds_infra::{
    GraphQlScheduleRepo, GraphQlSocrataSink, HttpClient, HttpGraphQlGateway, HttpProviderClient, ObjectStoreConfigStore,
    RTreeGeoEnricher, RunMode, RuntimeEnv, S3ObjectStore,
};

/// Everything a CLI command needs to run a stage: the hydrated config, the
/// warehouse/object-store/geo ports, and a ready-to-use `BlockExecutor`.
pub struct AppContext {
    pub env: RuntimeEnv,
    pub object_store: Arc<dyn ObjectStorePort>,
    pub config_store: Arc<dyn ConfigStorePort>,
    pub schedule_repo: Arc<dyn ScheduleRepoPort>,
    pub socrata_sink: Arc<dyn SocrataSinkPort>,
    pub gateway: Arc<dyn GraphQlGatewayPort>,
    pub executor: Arc<BlockExecutor>,
}

impl AppContext {
    pub async fn bootstrap(env_file: Option<&str>) -> Result<Self> {
        if let Some(path) = env_file {
            dotenvy::from_path(path)
                .map_err(|e| MdsError::ConfigMissing(format!("cannot load env file {path}: {e}")))?;
        } else {
            let _ = dotenvy::dotenv();
        }

        let env = RuntimeEnv::from_env()?;

        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(env.aws_region.clone()))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                env.aws_access_key_id.clone(),
                env.aws_secret_access_key.clone(),
                None,
                None,
                "mds-cli",
            ))
            .load()
            .await;
        let s3_client = aws_sdk_s3::Client::new(&aws_config);

        let encryption_key = match &env.fernet_key {
            Some(key) => Some(decode_fernet_key(key)?),
            None => None,
        };
        let object_store: Arc<dyn ObjectStorePort> =
            Arc::new(S3ObjectStore::new(s3_client, env.bucket.clone(), encryption_key)?);

        let config_store: Arc<dyn ConfigStorePort> = Arc::new(ObjectStoreConfigStore::new(
            Arc::clone(&object_store),
            env.providers_key.clone(),
            env.settings_key.clone(),
        ));
        config_store.load().await?;

        let hasura_endpoint = config_store
            .setting("HASURA_ENDPOINT", None)
            .ok_or_else(|| MdsError::ConfigMissing("missing HASURA_ENDPOINT setting".into()))?;
        let hasura_admin_key = config_store
            .setting("HASURA_ADMIN_KEY", None)
            .ok_or_else(|| MdsError::ConfigMissing("missing HASURA_ADMIN_KEY setting".into()))?;

        let http = HttpClient::new()?;
        let gateway: Arc<dyn GraphQlGatewayPort> =
            Arc::new(HttpGraphQlGateway::new(http.clone(), hasura_endpoint, hasura_admin_key));

        let schedule_repo: Arc<dyn ScheduleRepoPort> = Arc::new(GraphQlScheduleRepo::new(Arc::clone(&gateway)));

        let socrata_sink: Arc<dyn SocrataSinkPort> = Arc::new(GraphQlSocrataSink::new(
            http.clone(),
            Arc::clone(&gateway),
            config_store.setting("SOCRATA_DATA_ENDPOINT", None).unwrap_or_default(),
            config_store.setting("SOCRATA_DATASET", None).unwrap_or_default(),
            config_store.setting("SOCRATA_APP_TOKEN", None).unwrap_or_default(),
            config_store.setting("SOCRATA_KEY_ID", None).unwrap_or_default(),
            config_store.setting("SOCRATA_KEY_SECRET", None).unwrap_or_default(),
        ));

        let geo_enricher = Arc::new(RTreeGeoEnricher::load(
            &env.census_geojson_path,
            &env.districts_geojson_path,
            &env.hex_geojson_path,
        )?);

        let executor = Arc::new(BlockExecutor::new(
            Arc::clone(&object_store),
            Arc::clone(&schedule_repo),
            Arc::clone(&gateway),
            geo_enricher,
            Central,
            env.run_mode.as_path_segment(),
        ));

        Ok(Self { env, object_store, config_store, schedule_repo, socrata_sink, gateway, executor })
    }

    pub async fn provider_profile(&self, name: &str) -> Result<ProviderProfile> {
        self.config_store.provider_profile(name).await
    }

    pub fn provider_client(&self, profile: ProviderProfile) -> Result<HttpProviderClient> {
        let http = HttpClient::builder().max_attempts(profile.max_attempts as usize).build()?;
        Ok(HttpProviderClient::new(http, profile))
    }
}

fn decode_fernet_key(encoded: &str) -> Result<[u8; 32]> {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| MdsError::ConfigMissing(format!("ATD_MDS_FERNET_KEY is not valid base64: {e}")))?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| MdsError::ConfigMissing(format!("ATD_MDS_FERNET_KEY must decode to 32 bytes, got {}", v.len())))
}
