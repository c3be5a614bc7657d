use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Volume ceiling; full scale clips on most venue speakers.
pub const MAX_VOLUME: f32 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Ask the player to keep pitch constant when `rate != 1.0`.
    pub preserve_pitch: bool,
}

impl PlaybackOptions {
    pub fn new(rate: f32, pitch: f32) -> Self {
        Self {
            rate,
            pitch,
            volume: MAX_VOLUME,
            preserve_pitch: true,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Volume clamped into `0.0..=MAX_VOLUME`.
    pub fn effective_volume(&self) -> f32 {
        if self.volume.is_finite() {
            self.volume.clamp(0.0, MAX_VOLUME)
        } else {
            MAX_VOLUME
        }
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// How a single clip ended. Every variant hands control back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    Completed,
    TimedOut(Duration),
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_capped() {
        assert_eq!(PlaybackOptions::default().effective_volume(), MAX_VOLUME);
        assert_eq!(
            PlaybackOptions::default().with_volume(1.0).effective_volume(),
            MAX_VOLUME
        );
        assert_eq!(
            PlaybackOptions::default().with_volume(0.5).effective_volume(),
            0.5
        );
        assert_eq!(
            PlaybackOptions::default()
                .with_volume(f32::NAN)
                .effective_volume(),
            MAX_VOLUME
        );
    }
}
