use crate::{AudioPlayer, PlaybackOptions, PlaybackOutcome};
use speech_synth::AudioResource;
use std::time::Duration;

/// Extra time granted past the clip's own length before it is abandoned.
pub const DEFAULT_PLAYBACK_BUFFER: Duration = Duration::from_secs(2);
/// Assumed clip length when the synthesis service does not report one.
pub const DEFAULT_CLIP_ESTIMATE: Duration = Duration::from_secs(15);
/// Rates below this stretch the limit no further than this rate would.
pub const MIN_STRETCH_RATE: f32 = 0.1;

/// Bounds a single clip so a player that never reports its end cannot hold
/// the announcement lock.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackWatchdog {
    buffer: Duration,
    clip_estimate: Duration,
}

impl Default for PlaybackWatchdog {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYBACK_BUFFER, DEFAULT_CLIP_ESTIMATE)
    }
}

impl PlaybackWatchdog {
    pub fn new(buffer: Duration, clip_estimate: Duration) -> Self {
        Self {
            buffer,
            clip_estimate,
        }
    }

    /// Clip duration plus buffer. Slower speech stretches the clip, at most
    /// by `1 / MIN_STRETCH_RATE`.
    pub fn timeout_for(&self, resource: &AudioResource, options: &PlaybackOptions) -> Duration {
        let clip = resource.duration.unwrap_or(self.clip_estimate);
        let stretched = if options.rate.is_finite() && options.rate > 0.0 && options.rate < 1.0 {
            clip.div_f32(options.rate.max(MIN_STRETCH_RATE))
        } else {
            clip
        };
        stretched + self.buffer
    }

    /// Play `resource` to completion, to error, or until the timeout.
    /// Never returns an error; the outcome says which path was taken.
    pub async fn play(
        &self,
        player: &dyn AudioPlayer,
        resource: &AudioResource,
        options: &PlaybackOptions,
    ) -> PlaybackOutcome {
        let limit = self.timeout_for(resource, options);
        match tokio::time::timeout(limit, player.play(resource, options)).await {
            Ok(Ok(())) => PlaybackOutcome::Completed,
            Ok(Err(e)) => PlaybackOutcome::Failed(e.to_string()),
            Err(_) => {
                tracing::warn!(
                    player = player.name(),
                    url = %resource.url,
                    timeout_ms = limit.as_millis() as u64,
                    "playback watchdog fired"
                );
                PlaybackOutcome::TimedOut(limit)
            }
        }
    }
}
