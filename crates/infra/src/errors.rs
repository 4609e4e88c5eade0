//! Conversions from third-party error types into [`mds_domain::MdsError`].

use mds_domain::MdsError;

/// Wraps a lower-level infra failure before it is folded into [`MdsError`].
/// Kept as a distinct type so `From` impls can live close to the library
/// they translate, the way the teacher's own infra error module does.
#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("crypto error: {0}")]
    Crypto(#[from] mds_common::CryptoError),
}

impl From<InfraError> for MdsError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Http(e) => MdsError::Transport(e.to_string()),
            InfraError::Serde(e) => MdsError::ValidationError(e.to_string()),
            InfraError::Io(e) => MdsError::PlatformError(e.to_string()),
            InfraError::Crypto(e) => MdsError::PlatformError(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for MdsError {
    fn from(err: reqwest::Error) -> Self {
        let infra: InfraError = err.into();
        infra.into()
    }
}
