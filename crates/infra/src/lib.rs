//! # MDS Infrastructure
//!
//! Concrete adapters implementing the ports defined in `mds-core`.
//!
//! This crate contains:
//! - Configuration loading (environment + object-store-backed settings)
//! - The S3-backed object store
//! - An HTTP client with bounded retry
//! - The warehouse GraphQL gateway, schedule repository and Socrata sink
//! - Per-version provider clients
//! - The R-tree-backed geo enricher
//!
//! ## Architecture
//! - Implements traits defined in `mds-core`
//! - Depends on `mds-common`, `mds-domain` and `mds-core`
//! - Contains all "impure" code (I/O, network, filesystem)

pub mod config;
pub mod errors;
pub mod geo_enricher;
pub mod graphql_gateway;
pub mod http;
pub mod object_store;
pub mod provider_client;
pub mod schedule_repo;
pub mod socrata_sink;

pub use config::{ObjectStoreConfigStore, RunMode, RuntimeEnv};
pub use errors::InfraError;
pub use geo_enricher::RTreeGeoEnricher;
pub use graphql_gateway::HttpGraphQlGateway;
pub use http::{HttpClient, HttpClientBuilder};
pub use object_store::S3ObjectStore;
pub use provider_client::HttpProviderClient;
pub use schedule_repo::GraphQlScheduleRepo;
pub use socrata_sink::GraphQlSocrataSink;
