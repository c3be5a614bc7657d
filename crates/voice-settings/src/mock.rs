//! Scripted settings source for development and tests

use crate::source::SettingsSource;
use crate::types::VoiceSettings;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticket_call::{Error, Result};

/// Replays a script of fetch results; `None` entries fail. The last entry
/// repeats once the script is exhausted.
pub struct MockSettingsSource {
    script: Mutex<VecDeque<Option<VoiceSettings>>>,
    calls: AtomicUsize,
}

impl MockSettingsSource {
    pub fn scripted(script: Vec<Option<VoiceSettings>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixed(settings: VoiceSettings) -> Self {
        Self::scripted(vec![Some(settings)])
    }

    pub fn failing() -> Self {
        Self::scripted(vec![None])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsSource for MockSettingsSource {
    async fn fetch(&self, _tenant_id: &str) -> Result<VoiceSettings> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().flatten()
            } else {
                script.front().cloned().flatten()
            }
        };
        next.ok_or_else(|| Error::SettingsUnavailable("mock source offline".into()))
    }
}
