//! Source resolution strategy
//!
//! One strategy per source kind, matched exhaustively over
//! [`TrackSource`]. Local and direct-URL sources resolve without any
//! network call; remote catalogs go through their [`Catalog`]; tracks the
//! primary catalog cannot license walk an ordered fallback chain across
//! the other catalogs when the user has enabled substitution.

use crate::catalog::{Catalog, CredentialStore};
use async_trait::async_trait;
use cadence_core::{
    SettingsStore, SourceKind, StreamLocator, StreamResolver, TrackDescriptor, TrackSource,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fallback order when the primary catalog reports no playback rights.
const FALLBACK_CHAIN: [SourceKind; 2] = [SourceKind::Wavelet, SourceKind::Chime];

/// Resolves track descriptors to playable stream locators.
///
/// Holds one [`Catalog`] per remote kind plus the settings and credential
/// collaborators. Stateless per call: stale-result suppression belongs to
/// the playback session.
pub struct SourceResolver {
    halcyon: Arc<dyn Catalog>,
    halcyon_drive: Arc<dyn Catalog>,
    chime: Arc<dyn Catalog>,
    wavelet: Arc<dyn Catalog>,
    settings: Arc<dyn SettingsStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl SourceResolver {
    /// Create a resolver over the full catalog set.
    pub fn new(
        halcyon: Arc<dyn Catalog>,
        halcyon_drive: Arc<dyn Catalog>,
        chime: Arc<dyn Catalog>,
        wavelet: Arc<dyn Catalog>,
        settings: Arc<dyn SettingsStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            halcyon,
            halcyon_drive,
            chime,
            wavelet,
            settings,
            credentials,
        }
    }

    fn fallback_catalog(&self, kind: SourceKind) -> Option<&Arc<dyn Catalog>> {
        match kind {
            SourceKind::Chime => Some(&self.chime),
            SourceKind::Wavelet => Some(&self.wavelet),
            _ => None,
        }
    }

    /// Walk the fallback chain for a track the primary catalog cannot play.
    ///
    /// For each candidate catalog in order: search by title/artist, and
    /// resolve the first match against that catalog's own stream path. A
    /// candidate that errors or yields nothing is skipped, not fatal.
    async fn resolve_from_fallback(&self, track: &TrackDescriptor) -> StreamLocator {
        let artist = track.artist_line();
        for kind in FALLBACK_CHAIN {
            let Some(catalog) = self.fallback_catalog(kind) else {
                continue;
            };
            let matched = match catalog.search(&track.title, &artist).await {
                Ok(Some(m)) => m,
                Ok(None) => {
                    debug!(track = %track.id, catalog = %kind, "no fallback match");
                    continue;
                }
                Err(err) => {
                    warn!(track = %track.id, catalog = %kind, error = %err, "fallback search failed");
                    continue;
                }
            };
            match catalog.stream_url(&matched.id).await {
                Ok(Some(url)) if !url.is_empty() => {
                    debug!(
                        track = %track.id,
                        catalog = %kind,
                        substitute = %matched.id,
                        "resolved through fallback catalog"
                    );
                    return StreamLocator::Url(url);
                }
                Ok(_) => continue,
                Err(err) => {
                    warn!(track = %track.id, catalog = %kind, error = %err, "fallback stream lookup failed");
                    continue;
                }
            }
        }
        StreamLocator::Unavailable
    }

    async fn resolve_direct(
        &self,
        catalog: &Arc<dyn Catalog>,
        track: &TrackDescriptor,
    ) -> cadence_core::Result<StreamLocator> {
        match catalog.stream_url(&track.id).await? {
            Some(url) if !url.is_empty() => Ok(StreamLocator::Url(url)),
            _ => Ok(StreamLocator::Unavailable),
        }
    }
}

#[async_trait]
impl StreamResolver for SourceResolver {
    async fn resolve(&self, track: &TrackDescriptor) -> cadence_core::Result<StreamLocator> {
        match &track.source {
            TrackSource::Local { path } => Ok(StreamLocator::LocalFile(path.clone())),

            TrackSource::Mirror { url } => Ok(StreamLocator::Url(url.clone())),

            TrackSource::Halcyon { playable } => {
                if !playable {
                    let fallback = self.settings.cross_source_fallback().await?;
                    if !fallback {
                        debug!(track = %track.id, "no rights and fallback disabled");
                        return Ok(StreamLocator::Unavailable);
                    }
                    return Ok(self.resolve_from_fallback(track).await);
                }
                self.resolve_direct(&self.halcyon, track).await
            }

            TrackSource::HalcyonDrive => {
                if self
                    .credentials
                    .session(SourceKind::HalcyonDrive)
                    .await
                    .is_none()
                {
                    debug!(track = %track.id, "no session for authenticated catalog");
                    return Ok(StreamLocator::Unavailable);
                }
                self.resolve_direct(&self.halcyon_drive, track).await
            }

            TrackSource::Chime => self.resolve_direct(&self.chime, track).await,

            TrackSource::Wavelet => self.resolve_direct(&self.wavelet, track).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogMatch, NoCredentials};
    use crate::error::{Result as SourceResult, SourceError};
    use cadence_core::MemorySettings;
    use std::path::PathBuf;

    /// Scripted catalog: fixed responses, call log.
    struct FakeCatalog {
        stream: Option<String>,
        search: Option<CatalogMatch>,
        fail: bool,
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn with_stream(url: &str) -> Self {
            Self {
                stream: Some(url.to_string()),
                search: None,
                fail: false,
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                stream: None,
                search: None,
                fail: false,
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                stream: None,
                search: None,
                fail: true,
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn with_match(id: &str, url: &str) -> Self {
            Self {
                stream: Some(url.to_string()),
                search: Some(CatalogMatch {
                    id: id.to_string(),
                    title: "Found".to_string(),
                    artists: vec![],
                }),
                fail: false,
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn stream_url(&self, track_id: &str) -> SourceResult<Option<String>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("stream:{track_id}"));
            if self.fail {
                return Err(SourceError::Unreachable("fake outage".to_string()));
            }
            Ok(self.stream.clone())
        }

        async fn search(&self, title: &str, _artist: &str) -> SourceResult<Option<CatalogMatch>> {
            self.calls.lock().unwrap().push(format!("search:{title}"));
            if self.fail {
                return Err(SourceError::Unreachable("fake outage".to_string()));
            }
            Ok(self.search.clone())
        }
    }

    struct FixedCredentials(Option<String>);

    #[async_trait]
    impl CredentialStore for FixedCredentials {
        async fn session(&self, _kind: SourceKind) -> Option<String> {
            self.0.clone()
        }
    }

    fn track(id: &str, source: TrackSource) -> TrackDescriptor {
        TrackDescriptor {
            id: id.to_string(),
            title: format!("Title {id}"),
            artists: vec!["Artist".to_string()],
            cover_url: None,
            source,
        }
    }

    struct Fixture {
        halcyon: Arc<FakeCatalog>,
        drive: Arc<FakeCatalog>,
        chime: Arc<FakeCatalog>,
        wavelet: Arc<FakeCatalog>,
        settings: Arc<MemorySettings>,
    }

    impl Fixture {
        fn resolver(&self, credentials: Arc<dyn CredentialStore>) -> SourceResolver {
            SourceResolver::new(
                self.halcyon.clone(),
                self.drive.clone(),
                self.chime.clone(),
                self.wavelet.clone(),
                self.settings.clone(),
                credentials,
            )
        }
    }

    fn fixture(
        halcyon: FakeCatalog,
        drive: FakeCatalog,
        chime: FakeCatalog,
        wavelet: FakeCatalog,
    ) -> Fixture {
        Fixture {
            halcyon: Arc::new(halcyon),
            drive: Arc::new(drive),
            chime: Arc::new(chime),
            wavelet: Arc::new(wavelet),
            settings: Arc::new(MemorySettings::new()),
        }
    }

    #[tokio::test]
    async fn local_track_resolves_to_its_path() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
        );
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track(
                "1",
                TrackSource::Local {
                    path: PathBuf::from("/music/1.flac"),
                },
            ))
            .await
            .unwrap();

        assert_eq!(locator, StreamLocator::LocalFile(PathBuf::from("/music/1.flac")));
    }

    #[tokio::test]
    async fn mirror_track_uses_embedded_url() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
        );
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track(
                "1",
                TrackSource::Mirror {
                    url: "https://m.example.com/1.mp3".to_string(),
                },
            ))
            .await
            .unwrap();

        assert_eq!(
            locator,
            StreamLocator::Url("https://m.example.com/1.mp3".to_string())
        );
    }

    #[tokio::test]
    async fn playable_primary_track_resolves_directly() {
        let fx = fixture(
            FakeCatalog::with_stream("https://h.example.com/1.mp3"),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
        );
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track("1", TrackSource::Halcyon { playable: true }))
            .await
            .unwrap();

        assert_eq!(
            locator,
            StreamLocator::Url("https://h.example.com/1.mp3".to_string())
        );
        // No rights issue: the fallback catalogs are never consulted.
        assert!(fx.wavelet.calls.lock().unwrap().is_empty());
        assert!(fx.chime.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_rights_with_fallback_disabled_is_unavailable() {
        let fx = fixture(
            FakeCatalog::with_stream("https://h.example.com/1.mp3"),
            FakeCatalog::empty(),
            FakeCatalog::with_match("c9", "https://c.example.com/9.mp3"),
            FakeCatalog::with_match("w9", "https://w.example.com/9.mp3"),
        );
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track("1", TrackSource::Halcyon { playable: false }))
            .await
            .unwrap();

        assert_eq!(locator, StreamLocator::Unavailable);
        assert!(fx.wavelet.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_rights_resolves_through_first_fallback_match() {
        let fx = fixture(
            FakeCatalog::with_stream("https://h.example.com/1.mp3"),
            FakeCatalog::empty(),
            FakeCatalog::with_match("c9", "https://c.example.com/9.mp3"),
            FakeCatalog::with_match("w9", "https://w.example.com/9.mp3"),
        );
        fx.settings.set_cross_source_fallback(true).await;
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track("1", TrackSource::Halcyon { playable: false }))
            .await
            .unwrap();

        // Wavelet is first in the chain, so its match wins over Chime's.
        assert_eq!(
            locator,
            StreamLocator::Url("https://w.example.com/9.mp3".to_string())
        );
        assert_eq!(
            *fx.wavelet.calls.lock().unwrap(),
            vec!["search:Title 1".to_string(), "stream:w9".to_string()]
        );
        assert!(fx.chime.calls.lock().unwrap().is_empty());
        // The primary stream path is never hit for a no-rights track.
        assert!(fx.halcyon.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fallback_skips_failing_candidate() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::with_match("c9", "https://c.example.com/9.mp3"),
            FakeCatalog::failing(),
        );
        fx.settings.set_cross_source_fallback(true).await;
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track("1", TrackSource::Halcyon { playable: false }))
            .await
            .unwrap();

        assert_eq!(
            locator,
            StreamLocator::Url("https://c.example.com/9.mp3".to_string())
        );
    }

    #[tokio::test]
    async fn fallback_exhausted_is_unavailable() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
        );
        fx.settings.set_cross_source_fallback(true).await;
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track("1", TrackSource::Halcyon { playable: false }))
            .await
            .unwrap();

        assert_eq!(locator, StreamLocator::Unavailable);
    }

    #[tokio::test]
    async fn authenticated_catalog_without_session_is_unavailable() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::with_stream("https://d.example.com/1.mp3"),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
        );
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let locator = resolver
            .resolve(&track("1", TrackSource::HalcyonDrive))
            .await
            .unwrap();

        assert_eq!(locator, StreamLocator::Unavailable);
        assert!(fx.drive.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn authenticated_catalog_with_session_resolves() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::with_stream("https://d.example.com/1.mp3"),
            FakeCatalog::empty(),
            FakeCatalog::empty(),
        );
        let resolver = fx.resolver(Arc::new(FixedCredentials(Some("token".to_string()))));

        let locator = resolver
            .resolve(&track("1", TrackSource::HalcyonDrive))
            .await
            .unwrap();

        assert_eq!(
            locator,
            StreamLocator::Url("https://d.example.com/1.mp3".to_string())
        );
    }

    #[tokio::test]
    async fn direct_catalog_outage_is_an_error() {
        let fx = fixture(
            FakeCatalog::empty(),
            FakeCatalog::empty(),
            FakeCatalog::failing(),
            FakeCatalog::empty(),
        );
        let resolver = fx.resolver(Arc::new(NoCredentials));

        let result = resolver.resolve(&track("1", TrackSource::Chime)).await;
        assert!(result.is_err());
    }
}
