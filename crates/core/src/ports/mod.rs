//! Port traits consumed by `BlockExecutor`/`Orchestrator`. Concrete
//! implementations live in `mds-infra`.

pub mod config_store;
pub mod geo_enricher;
pub mod graphql_gateway;
pub mod object_store;
pub mod provider_client;
pub mod schedule_repo;
pub mod socrata_sink;

pub use config_store::ConfigStorePort;
pub use geo_enricher::GeoEnricherPort;
pub use graphql_gateway::GraphQlGatewayPort;
pub use object_store::ObjectStorePort;
pub use provider_client::{ProviderClientPort, ProviderTripsResponse};
pub use schedule_repo::{PendingBlocksQuery, ScheduleRepoPort};
pub use socrata_sink::{SocrataSinkPort, SocrataUpsertResult};
