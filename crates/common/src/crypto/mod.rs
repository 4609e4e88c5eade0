//! Symmetric cryptography for the object store's encryption boundary.

pub mod encryption;
pub mod token;

pub use encryption::{CryptoError, EncryptionService};
pub use token::FernetLikeToken;
