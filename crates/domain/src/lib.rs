//! # MDS Domain
//!
//! Pure domain types and error definitions for the MDS ingestion pipeline.
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod blob;
pub mod errors;
pub mod schedule;
pub mod trip;

pub use blob::{data_path, BlobObject};
pub use errors::{MdsError, Result};
pub use schedule::{ScheduleBlock, ScheduleStatus};
pub use trip::{GeoLayer, IdValue, MdsVersion, ProviderAuth, ProviderProfile, Trip};
