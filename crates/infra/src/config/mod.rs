//! Configuration loading and management.
//!
//! `loader` reads the handful of process environment variables needed to
//! stand up the object store; `config_store` implements `ConfigStorePort`
//! against blobs kept in that store.

pub mod config_store;
pub mod loader;

pub use config_store::ObjectStoreConfigStore;
pub use loader::{RunMode, RuntimeEnv};
