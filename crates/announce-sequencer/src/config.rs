use audio_playback::{PlaybackWatchdog, MAX_VOLUME};
use std::time::Duration;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_INTER_LANGUAGE_PAUSE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Pause between the end of one batch and the audio of the next, so the
    /// display can render the new ticket first.
    pub settle_delay: Duration,
    /// Gap between Box 1 and Box 2 of the same batch.
    pub inter_language_pause: Duration,
    pub volume: f32,
    pub watchdog: PlaybackWatchdog,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            inter_language_pause: DEFAULT_INTER_LANGUAGE_PAUSE,
            volume: MAX_VOLUME,
            watchdog: PlaybackWatchdog::default(),
        }
    }
}
