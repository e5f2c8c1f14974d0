//! Per-catalog resolution interface
//!
//! Each remote catalog the player aggregates exposes the same two
//! operations: a direct stream lookup by track id, and a title/artist
//! search used by the cross-source fallback chain. Transport details live
//! behind this trait.

use crate::error::Result;
use async_trait::async_trait;
use cadence_core::SourceKind;
use serde::{Deserialize, Serialize};

/// A match returned by a catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Track id within the catalog that produced the match
    pub id: String,

    /// Matched title
    pub title: String,

    /// Matched artist names
    #[serde(default)]
    pub artists: Vec<String>,
}

/// One remote catalog's resolution operations
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Direct stream lookup by catalog track id
    ///
    /// `Ok(None)` means the catalog knows no stream for this id; that is a
    /// normal outcome, not an error.
    async fn stream_url(&self, track_id: &str) -> Result<Option<String>>;

    /// Title/artist search, first match wins
    async fn search(&self, title: &str, artist: &str) -> Result<Option<CatalogMatch>>;
}

/// Authenticated-session lookup for catalogs that require one
///
/// Session acquisition (login, cookie import) is outside the engine; the
/// resolver only asks whether a session exists before attempting an
/// authenticated catalog, and catalog implementations attach it to their
/// requests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The stored session token for a source, if any
    async fn session(&self, kind: SourceKind) -> Option<String>;
}

/// A [`CredentialStore`] with no stored sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialStore for NoCredentials {
    async fn session(&self, _kind: SourceKind) -> Option<String> {
        None
    }
}
