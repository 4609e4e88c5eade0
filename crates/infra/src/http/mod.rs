//! A retrying HTTP client shared by every outbound integration (provider
//! APIs, the warehouse GraphQL gateway, Socrata).

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
