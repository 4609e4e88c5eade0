//! Shared low-level primitives used by the MDS ingestion crates.
//!
//! This crate carries only what has no natural home in a single layer of
//! the pipeline: the symmetric encryption primitive behind the object
//! store's encryption boundary. It has no dependency on `mds-domain` or
//! `mds-core` — it is pure, side-effect-free cryptography.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod crypto;

pub use crypto::{CryptoError, EncryptionService, FernetLikeToken};
