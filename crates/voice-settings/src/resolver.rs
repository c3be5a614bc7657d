use crate::cache::FallbackCache;
use crate::source::SettingsSource;
use crate::types::{ResolvedSettings, SettingsOrigin, VoiceSettings};
use std::sync::Arc;

/// Resolves the voice profile at the start of every batch.
///
/// The source is always asked first so admin changes apply to the very next
/// call; the fallback cache is only consulted when that fetch fails.
pub struct SettingsResolver {
    source: Arc<dyn SettingsSource>,
    tenant_id: String,
    fallback: FallbackCache,
}

impl SettingsResolver {
    pub fn new(source: Arc<dyn SettingsSource>, tenant_id: impl Into<String>) -> Self {
        Self {
            source,
            tenant_id: tenant_id.into(),
            fallback: FallbackCache::in_memory(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackCache) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub async fn resolve(&self) -> ResolvedSettings {
        match self.source.fetch(&self.tenant_id).await {
            Ok(settings) => {
                let settings = settings.normalized();
                self.fallback.store(&settings);
                ResolvedSettings {
                    settings,
                    origin: SettingsOrigin::Fresh,
                }
            }
            Err(e) => match self.fallback.get() {
                Some(settings) => {
                    tracing::warn!(tenant = %self.tenant_id, error = %e, "settings fetch failed, using last known settings");
                    ResolvedSettings {
                        settings,
                        origin: SettingsOrigin::Cached,
                    }
                }
                None => {
                    tracing::warn!(tenant = %self.tenant_id, error = %e, "settings fetch failed, using defaults");
                    ResolvedSettings {
                        settings: VoiceSettings::default(),
                        origin: SettingsOrigin::Default,
                    }
                }
            },
        }
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock::MockSettingsSource;

    fn arabic_first() -> VoiceSettings {
        VoiceSettings {
            voice_identity: "female".into(),
            languages: vec!["ar".into(), "en".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fresh_then_cached_then_fresh_again() {
        let source = Arc::new(MockSettingsSource::scripted(vec![
            Some(arabic_first()),
            None,
            Some(VoiceSettings::default()),
        ]));
        let resolver = SettingsResolver::new(source.clone(), "tenant-1");

        let first = resolver.resolve().await;
        assert_eq!(first.origin, SettingsOrigin::Fresh);
        assert_eq!(first.settings, arabic_first());

        let second = resolver.resolve().await;
        assert_eq!(second.origin, SettingsOrigin::Cached);
        assert_eq!(second.settings, arabic_first());

        // Admin changed the profile: picked up immediately, not served from cache.
        let third = resolver.resolve().await;
        assert_eq!(third.origin, SettingsOrigin::Fresh);
        assert_eq!(third.settings, VoiceSettings::default());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn defaults_without_any_fallback() {
        let resolver = SettingsResolver::new(Arc::new(MockSettingsSource::failing()), "t");
        let resolved = resolver.resolve().await;
        assert_eq!(resolved.origin, SettingsOrigin::Default);
        assert_eq!(resolved.settings, VoiceSettings::default());
    }

    #[tokio::test]
    async fn persisted_fallback_is_used_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.json");
        FallbackCache::with_file(&path).store(&arabic_first());

        let resolver = SettingsResolver::new(Arc::new(MockSettingsSource::failing()), "t")
            .with_fallback(FallbackCache::with_file(&path));
        let resolved = resolver.resolve().await;
        assert_eq!(resolved.origin, SettingsOrigin::Cached);
        assert_eq!(resolved.settings.languages, vec!["ar", "en"]);
    }
}
