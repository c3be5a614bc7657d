use crate::types::VoiceSettings;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

/// Last successfully fetched settings, optionally mirrored to a JSON file so
/// a restarted display still speaks with the tenant's voice while the backend
/// is down.
#[derive(Debug, Default)]
pub struct FallbackCache {
    last: RwLock<Option<VoiceSettings>>,
    path: Option<PathBuf>,
}

impl FallbackCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Back the cache with `path`, loading whatever it already holds.
    pub fn with_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let last = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<VoiceSettings>(&raw) {
                Ok(settings) => Some(settings.normalized()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings cache");
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            last: RwLock::new(last),
            path: Some(path),
        }
    }

    pub fn get(&self) -> Option<VoiceSettings> {
        self.last.read().clone()
    }

    pub fn store(&self, settings: &VoiceSettings) {
        *self.last.write() = Some(settings.clone());
        if let Some(ref path) = self.path {
            if let Err(e) = persist(path, settings) {
                tracing::warn!(path = %path.display(), error = %e, "failed to persist settings cache");
            }
        }
    }
}

fn persist(path: &Path, settings: &VoiceSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backed_cache_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("voice.json");

        let cache = FallbackCache::with_file(&path);
        assert!(cache.get().is_none());

        let settings = VoiceSettings {
            voice_identity: "female".into(),
            languages: vec!["ar".into()],
            ..Default::default()
        };
        cache.store(&settings);

        let reloaded = FallbackCache::with_file(&path);
        assert_eq!(reloaded.get(), Some(settings));
    }

    #[test]
    fn garbage_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.json");
        fs::write(&path, "not json").unwrap();
        assert!(FallbackCache::with_file(&path).get().is_none());
    }
}
