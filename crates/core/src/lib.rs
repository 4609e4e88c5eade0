//! # MDS Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) consumed by `mds-infra`
//! - The `BlockExecutor` state machine and `Orchestrator` scheduling loop
//! - Trip validation, enrichment, and mutation-rendering logic
//!
//! ## Architecture Principles
//! - Only depends on `mds-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod block_executor;
pub mod graphql_value;
pub mod orchestrator;
pub mod ports;
pub mod trip_model;

pub use block_executor::{BlockExecutor, StageOutcome};
pub use graphql_value::GraphQlValue;
pub use orchestrator::{Orchestrator, OrchestratorConfig, PassSummary, ProviderClientResolver};
pub use ports::{
    ConfigStorePort, GeoEnricherPort, GraphQlGatewayPort, ObjectStorePort, PendingBlocksQuery,
    ProviderClientPort, ProviderTripsResponse, ScheduleRepoPort, SocrataSinkPort, SocrataUpsertResult,
};
