//! Environment loading for the pipeline's runtime settings.
//!
//! ConfigStore itself hydrates provider profiles and free-form settings from
//! two JSON blobs in the object store (see [`crate::config::config_store`]).
//! This module only reads the handful of process environment variables
//! needed to construct the object store client and locate those blobs.
//!
//! ## Environment Variables
//! - `AWS_DEFAULT_REGION`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: S3 credentials
//! - `ATD_MDS_BUCKET`: target bucket
//! - `ATD_MDS_RUN_MODE`: `STAGING` or `PRODUCTION`
//! - `ATD_MDS_PROVIDERS`: object-store key for the providers blob
//! - `ATD_MDS_SETTINGS`: object-store key for the settings blob
//! - `ATD_MDS_FERNET_KEY`: base64-encoded 32-byte symmetric key
//! - `ATD_MDS_CENSUS_GEOJSON`, `ATD_MDS_DISTRICTS_GEOJSON`, `ATD_MDS_HEX_GEOJSON`: local file paths
//! - `ATD_MDS_MAX_THREADS`: concurrency bound for the orchestrator

use mds_domain::{MdsError, Result};

/// The run mode selects whether blobs are written under `staging/` or
/// `processed/` key prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Staging,
    Production,
}

impl RunMode {
    pub fn as_path_segment(self) -> &'static str {
        match self {
            RunMode::Staging => "staging",
            RunMode::Production => "processed",
        }
    }
}

/// Process-environment settings needed to stand up the object store and
/// locate the providers/settings blobs and static geo layers.
#[derive(Debug, Clone)]
pub struct RuntimeEnv {
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub bucket: String,
    pub run_mode: RunMode,
    pub providers_key: String,
    pub settings_key: String,
    pub fernet_key: Option<String>,
    pub census_geojson_path: String,
    pub districts_geojson_path: String,
    pub hex_geojson_path: String,
    pub max_threads: usize,
}

impl RuntimeEnv {
    /// Loads every required variable from the process environment.
    ///
    /// # Errors
    /// Returns [`MdsError::ConfigMissing`] if any required variable is unset
    /// or has an invalid value.
    pub fn from_env() -> Result<Self> {
        let run_mode = match env_var("ATD_MDS_RUN_MODE")?.to_ascii_uppercase().as_str() {
            "STAGING" => RunMode::Staging,
            "PRODUCTION" => RunMode::Production,
            other => return Err(MdsError::ConfigMissing(format!("invalid ATD_MDS_RUN_MODE: {other}"))),
        };

        Ok(Self {
            aws_region: env_var("AWS_DEFAULT_REGION")?,
            aws_access_key_id: env_var("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: env_var("AWS_SECRET_ACCESS_KEY")?,
            bucket: env_var("ATD_MDS_BUCKET")?,
            run_mode,
            providers_key: env_var("ATD_MDS_PROVIDERS")?,
            settings_key: env_var("ATD_MDS_SETTINGS")?,
            fernet_key: std::env::var("ATD_MDS_FERNET_KEY").ok(),
            census_geojson_path: env_var("ATD_MDS_CENSUS_GEOJSON")?,
            districts_geojson_path: env_var("ATD_MDS_DISTRICTS_GEOJSON")?,
            hex_geojson_path: env_var("ATD_MDS_HEX_GEOJSON")?,
            max_threads: env_var("ATD_MDS_MAX_THREADS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
        })
    }
}

/// Required environment variable.
///
/// # Errors
/// Returns [`MdsError::ConfigMissing`] if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| MdsError::ConfigMissing(format!("missing required environment variable: {key}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const REQUIRED_VARS: &[&str] = &[
        "AWS_DEFAULT_REGION",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "ATD_MDS_BUCKET",
        "ATD_MDS_RUN_MODE",
        "ATD_MDS_PROVIDERS",
        "ATD_MDS_SETTINGS",
        "ATD_MDS_CENSUS_GEOJSON",
        "ATD_MDS_DISTRICTS_GEOJSON",
        "ATD_MDS_HEX_GEOJSON",
    ];

    fn set_all() {
        std::env::set_var("AWS_DEFAULT_REGION", "us-east-1");
        std::env::set_var("AWS_ACCESS_KEY_ID", "key");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
        std::env::set_var("ATD_MDS_BUCKET", "atd-mds-data");
        std::env::set_var("ATD_MDS_RUN_MODE", "staging");
        std::env::set_var("ATD_MDS_PROVIDERS", "config/providers.json");
        std::env::set_var("ATD_MDS_SETTINGS", "config/settings.json");
        std::env::set_var("ATD_MDS_CENSUS_GEOJSON", "layers/census.geojson");
        std::env::set_var("ATD_MDS_DISTRICTS_GEOJSON", "layers/districts.geojson");
        std::env::set_var("ATD_MDS_HEX_GEOJSON", "layers/hex.geojson");
    }

    fn clear_all() {
        for var in REQUIRED_VARS {
            std::env::remove_var(var);
        }
        std::env::remove_var("ATD_MDS_FERNET_KEY");
        std::env::remove_var("ATD_MDS_MAX_THREADS");
    }

    #[test]
    fn loads_successfully_when_all_vars_present() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        set_all();

        let env = RuntimeEnv::from_env().expect("should load");
        assert_eq!(env.bucket, "atd-mds-data");
        assert_eq!(env.run_mode.as_path_segment(), "staging");
        assert_eq!(env.max_threads, 4);

        clear_all();
    }

    #[test]
    fn fails_with_config_missing_when_a_var_is_absent() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        set_all();
        std::env::remove_var("ATD_MDS_BUCKET");

        let err = RuntimeEnv::from_env().unwrap_err();
        assert!(matches!(err, MdsError::ConfigMissing(_)));

        clear_all();
    }

    #[test]
    fn rejects_unrecognized_run_mode() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        set_all();
        std::env::set_var("ATD_MDS_RUN_MODE", "NOT_A_MODE");

        let err = RuntimeEnv::from_env().unwrap_err();
        assert!(matches!(err, MdsError::ConfigMissing(_)));

        clear_all();
    }
}
