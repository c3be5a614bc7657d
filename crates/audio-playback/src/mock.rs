//! In-process player that only waits out the clip length

use crate::{AudioPlayer, PlaybackOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use speech_synth::AudioResource;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use ticket_call::{Error, Result};

/// One clip as seen by the mock player.
#[derive(Debug, Clone)]
pub struct PlayRecord {
    pub url: String,
    pub language: String,
    pub volume: f32,
    pub started: Instant,
}

#[derive(Default)]
pub struct MockPlayer {
    plays: Mutex<Vec<PlayRecord>>,
    hang: HashSet<String>,
    fail: HashSet<String>,
    active: Arc<AtomicUsize>,
    max_active: AtomicUsize,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips in `language` never finish on their own.
    pub fn hang_on(mut self, language: &str) -> Self {
        self.hang.insert(language.to_string());
        self
    }

    /// Clips in `language` fail immediately.
    pub fn fail_on(mut self, language: &str) -> Self {
        self.fail.insert(language.to_string());
        self
    }

    pub fn plays(&self) -> Vec<PlayRecord> {
        self.plays.lock().clone()
    }

    /// Clips currently playing.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of clips that were ever playing at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioPlayer for MockPlayer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn play(&self, resource: &AudioResource, options: &PlaybackOptions) -> Result<()> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(self.active.clone());
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        self.plays.lock().push(PlayRecord {
            url: resource.url.clone(),
            language: resource.language.clone(),
            volume: options.effective_volume(),
            started: Instant::now(),
        });

        if self.fail.contains(&resource.language) {
            return Err(Error::PlaybackError(format!(
                "mock decode error for {}",
                resource.url
            )));
        }
        if self.hang.contains(&resource.language) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(resource.duration.unwrap_or(Duration::from_millis(10))).await;
        Ok(())
    }
}
