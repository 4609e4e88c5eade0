//! Error types used throughout the ingestion pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the MDS ingestion pipeline.
///
/// Variants map directly onto the error kinds a stage can raise. Transport,
/// validation, and platform errors are handled locally within a stage (see
/// `BlockExecutor`); only `ConfigMissing` and unhandled programmer errors are
/// expected to escape to the process boundary.
#[derive(Error, Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", content = "message")]
pub enum MdsError {
    /// Missing environment variable or unknown provider name. Fatal at
    /// startup.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// Provider or warehouse authentication failed. Non-retryable; fails the
    /// current stage.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Timeout, 5xx, or connection error. Retried with backoff up to
    /// `max_attempts` before being treated like `AuthFailure`.
    #[error("transport error: {0}")]
    Transport(String),

    /// A trip failed schema validation. Counted per-trip; never fails the
    /// block on its own.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Extract's blob was missing when DB-Sync looked for it.
    #[error("blob not found: {0}")]
    NotFoundBlob(String),

    /// The open-data platform's upsert reported errors.
    #[error("platform error: {0}")]
    PlatformError(String),

    /// The MDS version string on a provider profile has no known client
    /// implementation.
    #[error("unsupported MDS version: {0}")]
    UnsupportedVersion(String),

    /// Object store client was used before it finished initializing.
    #[error("object store not initialized")]
    NotInitialized,

    /// Anything else; should be rare and is always logged with its source.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for MDS pipeline operations.
pub type Result<T> = std::result::Result<T, MdsError>;
