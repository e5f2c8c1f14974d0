//! Cadence Sources
//!
//! Multi-catalog stream resolution: deciding, per track, how to obtain a
//! playable stream.
//!
//! This crate provides:
//! - [`Catalog`]: the per-remote-catalog interface (direct stream lookup and
//!   title/artist search)
//! - [`SourceResolver`]: the resolution strategy over the closed set of
//!   source kinds, including the cross-source fallback chain for tracks the
//!   primary catalog cannot license
//! - [`HttpCatalog`]: a `reqwest`-backed [`Catalog`] for JSON bridge APIs
//! - [`CredentialStore`]: authenticated-session lookup for catalogs that
//!   require one
//!
//! The resolver implements [`cadence_core::StreamResolver`]; the playback
//! session consumes it through that seam and handles stale-result
//! suppression itself.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod http;
pub mod resolver;

pub use catalog::{Catalog, CatalogMatch, CredentialStore, NoCredentials};
pub use error::{Result, SourceError};
pub use http::HttpCatalog;
pub use resolver::SourceResolver;
