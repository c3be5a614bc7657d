//! The per-batch loop: every configured language box, one after the other.

use crate::config::SequencerConfig;
use crate::metrics::SequencerMetrics;
use audio_playback::{AudioPlayer, PlaybackOptions, PlaybackOutcome};
use speech_synth::{SynthesisRequest, Synthesizer};
use std::sync::Arc;
use ticket_call::{AnnouncementRequest, Error};
use tracing::{info, warn};
use uuid::Uuid;
use voice_settings::{SettingsOrigin, SettingsResolver};

/// A language box that did not play, and why.
#[derive(Debug)]
pub struct SkippedBox {
    pub language: String,
    pub reason: Error,
}

/// What happened during one batch.
#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub ticket_number: String,
    pub settings_origin: SettingsOrigin,
    pub played: Vec<String>,
    pub skipped: Vec<SkippedBox>,
}

impl BatchReport {
    fn skip(&mut self, language: &str, reason: Error) {
        self.skipped.push(SkippedBox {
            language: language.to_string(),
            reason,
        });
    }
}

/// Runs the language boxes of a batch against the external collaborators.
pub struct BatchRunner {
    settings: Arc<SettingsResolver>,
    synthesizer: Arc<dyn Synthesizer>,
    player: Arc<dyn AudioPlayer>,
    config: SequencerConfig,
    metrics: SequencerMetrics,
}

impl BatchRunner {
    pub fn new(
        settings: Arc<SettingsResolver>,
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<dyn AudioPlayer>,
        config: SequencerConfig,
        metrics: SequencerMetrics,
    ) -> Self {
        Self {
            settings,
            synthesizer,
            player,
            config,
            metrics,
        }
    }

    /// Play every box for `request`. Failures skip the box; this never errors.
    pub async fn run_batch(&self, request: &AnnouncementRequest, batch_id: Uuid) -> BatchReport {
        let resolved = self.settings.resolve().await;
        let settings = resolved.settings;
        let mut report = BatchReport {
            batch_id,
            ticket_number: request.ticket_number.clone(),
            settings_origin: resolved.origin,
            played: Vec::new(),
            skipped: Vec::new(),
        };

        let boxes = settings.languages.len();
        for (index, language) in settings.languages.iter().enumerate() {
            let box_no = index + 1;
            let text = text_localizer::localize(
                &request.ticket_number,
                &request.counter_number,
                language,
            );

            let synthesis = SynthesisRequest {
                text,
                voice_identity: settings.voice_identity.clone(),
                rate: settings.speech_rate,
                pitch: settings.speech_pitch,
                language: language.clone(),
            };
            let resource = match self.synthesizer.synthesize(&synthesis).await {
                Ok(resource) => resource,
                Err(e) => {
                    warn!(%batch_id, box_no, %language, error = %e, "synthesis failed, skipping box");
                    self.metrics.boxes_skipped.inc();
                    report.skip(language, e);
                    continue;
                }
            };

            if let Err(e) = self.synthesizer.verify(&resource).await {
                warn!(%batch_id, box_no, %language, error = %e, "audio pre-flight failed, skipping box");
                self.metrics.boxes_skipped.inc();
                report.skip(language, e);
                continue;
            }

            let options = PlaybackOptions::new(settings.speech_rate, settings.speech_pitch)
                .with_volume(self.config.volume);
            match self
                .config
                .watchdog
                .play(self.player.as_ref(), &resource, &options)
                .await
            {
                PlaybackOutcome::Completed => {
                    info!(%batch_id, box_no, %language, ticket = %request.ticket_number, "box played");
                    self.metrics.boxes_played.inc();
                    report.played.push(language.clone());
                }
                PlaybackOutcome::TimedOut(limit) => {
                    warn!(%batch_id, box_no, %language, "playback abandoned by watchdog");
                    self.metrics.boxes_skipped.inc();
                    report.skip(language, Error::PlaybackTimeout(limit));
                }
                PlaybackOutcome::Failed(msg) => {
                    warn!(%batch_id, box_no, %language, error = %msg, "playback failed");
                    self.metrics.boxes_skipped.inc();
                    report.skip(language, Error::PlaybackError(msg));
                }
            }

            if box_no < boxes {
                tokio::time::sleep(self.config.inter_language_pause).await;
            }
        }

        report
    }
}
