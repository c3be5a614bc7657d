use crate::PlaybackOptions;
use async_trait::async_trait;
use speech_synth::AudioResource;
use ticket_call::Result;

/// Plays one clip and resolves when it has finished.
///
/// Implementations must stop producing sound when the returned future is
/// dropped; the watchdog relies on that to abandon a hung clip.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    fn name(&self) -> &str;

    async fn play(&self, resource: &AudioResource, options: &PlaybackOptions) -> Result<()>;
}
