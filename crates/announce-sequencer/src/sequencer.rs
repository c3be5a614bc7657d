use crate::config::SequencerConfig;
use crate::metrics::SequencerMetrics;
use crate::playback::BatchRunner;
use crate::state::{SequencerState, SubmitOutcome};
use parking_lot::Mutex;
use std::sync::Arc;
use ticket_call::{AnnouncementRequest, CallEvent, DisplayedCall};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};
use uuid::Uuid;

struct Inner {
    state: Mutex<SequencerState>,
    runner: BatchRunner,
    config: SequencerConfig,
    metrics: SequencerMetrics,
    display_tx: watch::Sender<Option<DisplayedCall>>,
    announcing_tx: watch::Sender<bool>,
}

impl Inner {
    /// Completion transition. Publishes the next displayed call, if any.
    fn finish_batch(&self) -> Option<AnnouncementRequest> {
        let mut state = self.state.lock();
        let next = state.finish_batch();
        self.metrics.batches_completed.inc();
        self.metrics.queue_depth.set(state.pending_len() as i64);
        if next.is_some() {
            self.metrics.batches_started.inc();
            self.display_tx
                .send_replace(state.currently_displayed().cloned());
        } else {
            self.announcing_tx.send_replace(false);
        }
        next
    }
}

/// Releases the announcement lock if the driver task is torn down before it
/// reached the idle transition.
struct LockGuard {
    inner: Arc<Inner>,
    armed: bool,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.armed {
            error!("announcement driver stopped mid-batch, releasing lock");
            self.inner.state.lock().release();
            self.inner.announcing_tx.send_replace(false);
        }
    }
}

/// Handle to the single announcement pipeline of a display.
///
/// Cheap to clone. `submit` must be called from within a tokio runtime.
#[derive(Clone)]
pub struct Sequencer {
    inner: Arc<Inner>,
}

impl Sequencer {
    pub fn new(runner: BatchRunner, config: SequencerConfig, metrics: SequencerMetrics) -> Self {
        let (display_tx, _) = watch::channel(None);
        let (announcing_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SequencerState::new()),
                runner,
                config,
                metrics,
                display_tx,
                announcing_tx,
            }),
        }
    }

    /// Accept, queue or reject a call. Never waits on audio.
    pub fn submit(&self, request: AnnouncementRequest) -> SubmitOutcome {
        let outcome = {
            let mut state = self.inner.state.lock();
            let outcome = state.accept(request.clone());
            match outcome {
                SubmitOutcome::Started => {
                    self.inner.metrics.batches_started.inc();
                    self.inner
                        .display_tx
                        .send_replace(state.currently_displayed().cloned());
                    self.inner.announcing_tx.send_replace(true);
                }
                SubmitOutcome::Queued { .. } => {
                    self.inner.metrics.requests_queued.inc();
                    self.inner
                        .metrics
                        .queue_depth
                        .set(state.pending_len() as i64);
                }
                SubmitOutcome::Duplicate => self.inner.metrics.requests_duplicate.inc(),
                SubmitOutcome::Stale => self.inner.metrics.requests_stale.inc(),
            }
            outcome
        };

        if outcome == SubmitOutcome::Started {
            self.spawn_driver(request);
        }
        outcome
    }

    /// Consume detector events one at a time until every producer is gone.
    pub async fn run(&self, mut events: mpsc::Receiver<CallEvent>) {
        while let Some(event) = events.recv().await {
            let outcome = self.submit(event.request.clone());
            match outcome {
                SubmitOutcome::Started | SubmitOutcome::Queued { .. } => info!(
                    origin = %event.origin,
                    ticket = %event.request.ticket_number,
                    counter = %event.request.counter_number,
                    ?outcome,
                    "call accepted"
                ),
                SubmitOutcome::Duplicate | SubmitOutcome::Stale => debug!(
                    origin = %event.origin,
                    ticket = %event.request.ticket_number,
                    ?outcome,
                    "call ignored"
                ),
            }
        }
        debug!("all call detectors closed");
    }

    pub fn subscribe_display(&self) -> watch::Receiver<Option<DisplayedCall>> {
        self.inner.display_tx.subscribe()
    }

    pub fn current_display(&self) -> Option<DisplayedCall> {
        self.inner.state.lock().currently_displayed().cloned()
    }

    pub fn snapshot(&self) -> SequencerState {
        self.inner.state.lock().clone()
    }

    pub fn is_announcing(&self) -> bool {
        self.inner.state.lock().is_announcing()
    }

    pub fn metrics(&self) -> &SequencerMetrics {
        &self.inner.metrics
    }

    /// Resolve once no batch is in flight and the queue is drained.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.announcing_tx.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    fn spawn_driver(&self, first: AnnouncementRequest) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut guard = LockGuard {
                inner: inner.clone(),
                armed: true,
            };
            let mut current = first;
            loop {
                let batch_id = Uuid::new_v4();
                info!(
                    %batch_id,
                    ticket = %current.ticket_number,
                    counter = %current.counter_number,
                    "announcement batch started"
                );

                // Own task, so a panic in a collaborator ends here as a JoinError.
                let batch_inner = inner.clone();
                let request = current.clone();
                let result = tokio::spawn(async move {
                    batch_inner.runner.run_batch(&request, batch_id).await
                })
                .await;
                match result {
                    Ok(report) => info!(
                        %batch_id,
                        ticket = %report.ticket_number,
                        played = report.played.len(),
                        skipped = report.skipped.len(),
                        settings = ?report.settings_origin,
                        "announcement batch finished"
                    ),
                    Err(e) => error!(%batch_id, error = %e, "announcement batch aborted"),
                }

                match inner.finish_batch() {
                    Some(next) => {
                        tokio::time::sleep(inner.config.settle_delay).await;
                        current = next;
                    }
                    None => {
                        guard.armed = false;
                        break;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use audio_playback::{MockPlayer, PlaybackWatchdog};
    use speech_synth::{AudioResource, MockSynthesizer, SynthesisRequest, Synthesizer};
    use std::time::Duration;
    use ticket_call::{CallOrigin, Result};
    use voice_settings::{MockSettingsSource, SettingsResolver, VoiceSettings};

    const CLIP: Duration = Duration::from_millis(40);

    fn settings(languages: &[&str]) -> VoiceSettings {
        VoiceSettings {
            languages: languages.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    fn config(pause: Duration) -> SequencerConfig {
        SequencerConfig {
            settle_delay: Duration::from_millis(10),
            inter_language_pause: pause,
            watchdog: PlaybackWatchdog::new(Duration::from_millis(100), Duration::from_secs(1)),
            ..Default::default()
        }
    }

    fn build(
        settings: VoiceSettings,
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<MockPlayer>,
        pause: Duration,
    ) -> Sequencer {
        build_with(config(pause), settings, synthesizer, player)
    }

    fn build_with(
        cfg: SequencerConfig,
        settings: VoiceSettings,
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<MockPlayer>,
    ) -> Sequencer {
        let resolver = Arc::new(SettingsResolver::new(
            Arc::new(MockSettingsSource::fixed(settings)),
            "tenant-1",
        ));
        let metrics = SequencerMetrics::new().unwrap();
        let runner = BatchRunner::new(resolver, synthesizer, player, cfg.clone(), metrics.clone());
        Sequencer::new(runner, cfg, metrics)
    }

    fn req(ticket: &str, ts: i64) -> AnnouncementRequest {
        AnnouncementRequest::new(ticket, "5", ts)
    }

    async fn settle(sequencer: &Sequencer) {
        tokio::time::timeout(Duration::from_secs(5), sequencer.wait_idle())
            .await
            .expect("sequencer never went idle");
    }

    fn spoken(synth: &MockSynthesizer) -> Vec<String> {
        synth.requests().into_iter().map(|r| r.text).collect()
    }

    #[tokio::test]
    async fn single_flight_and_call_order() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let seq = build(settings(&["en"]), synth.clone(), player.clone(), Duration::ZERO);

        assert_eq!(seq.submit(req("P-1", 100)), SubmitOutcome::Started);
        // Arrive out of order while the first batch is playing.
        assert_eq!(
            seq.submit(req("P-3", 300)),
            SubmitOutcome::Queued { position: 0 }
        );
        assert_eq!(
            seq.submit(req("P-2", 200)),
            SubmitOutcome::Queued { position: 0 }
        );
        settle(&seq).await;

        assert_eq!(
            spoken(&synth),
            vec![
                "Ticket number 1 please come to counter 5",
                "Ticket number 2 please come to counter 5",
                "Ticket number 3 please come to counter 5",
            ]
        );
        assert_eq!(player.max_concurrent(), 1);
        assert_eq!(seq.metrics().batches_completed.get(), 3);
        assert_eq!(seq.current_display().unwrap().ticket_number, "P-3");
    }

    #[tokio::test]
    async fn display_updates_synchronously_only_for_the_active_call() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let seq = build(settings(&["en"]), synth, player, Duration::ZERO);
        let display = seq.subscribe_display();

        seq.submit(req("P-101", 100));
        assert_eq!(seq.current_display().unwrap().ticket_number, "P-101");
        assert_eq!(display.borrow().as_ref().unwrap().ticket_number, "P-101");

        seq.submit(req("P-102", 200));
        assert_eq!(seq.current_display().unwrap().ticket_number, "P-101");
        settle(&seq).await;
        assert_eq!(display.borrow().as_ref().unwrap().ticket_number, "P-102");
    }

    #[tokio::test]
    async fn duplicates_play_once() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let seq = build(settings(&["en"]), synth.clone(), player, Duration::ZERO);

        seq.submit(req("P-1", 100));
        assert_eq!(seq.submit(req("p-1", 150)), SubmitOutcome::Duplicate);
        seq.submit(req("P-2", 200));
        assert_eq!(seq.submit(req("P-2 ", 250)), SubmitOutcome::Duplicate);
        settle(&seq).await;

        assert_eq!(synth.requests().len(), 2);
        assert_eq!(seq.metrics().requests_duplicate.get(), 2);
    }

    #[tokio::test]
    async fn stale_requests_change_nothing() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let seq = build(settings(&["en"]), synth.clone(), player, Duration::ZERO);

        seq.submit(req("P-5", 500));
        assert_eq!(seq.submit(req("P-4", 400)), SubmitOutcome::Stale);
        assert_eq!(seq.submit(req("P-6", 500)), SubmitOutcome::Stale);
        assert_eq!(seq.snapshot().pending_len(), 0);
        assert_eq!(seq.current_display().unwrap().ticket_number, "P-5");
        settle(&seq).await;
        assert_eq!(synth.requests().len(), 1);
    }

    #[tokio::test]
    async fn next_call_waits_for_settle_delay_after_display_switch() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let settle_delay = Duration::from_millis(300);
        let cfg = SequencerConfig {
            settle_delay,
            ..config(Duration::ZERO)
        };
        let seq = build_with(cfg, settings(&["en"]), synth, player.clone());
        let mut display = seq.subscribe_display();

        seq.submit(req("P-1", 100));
        seq.submit(req("P-2", 200));

        tokio::time::timeout(
            Duration::from_secs(2),
            display.wait_for(|d| d.as_ref().is_some_and(|c| c.ticket_number == "P-2")),
        )
        .await
        .unwrap()
        .unwrap();
        // The board already shows the next call, its audio has not started.
        assert_eq!(player.plays().len(), 1);
        assert!(seq.is_announcing());

        settle(&seq).await;
        let plays = player.plays();
        assert_eq!(plays.len(), 2);
        assert!(plays[1].started.duration_since(plays[0].started) >= CLIP + settle_delay);
    }

    #[tokio::test]
    async fn english_then_dubai_arabic_with_gap() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let pause = Duration::from_millis(200);
        let seq = build(settings(&["en", "ar-ae"]), synth.clone(), player.clone(), pause);

        seq.submit(req("P-101", 100));
        settle(&seq).await;

        let texts = spoken(&synth);
        assert_eq!(texts[0], "Ticket number 101 please come to counter 5");
        assert!(texts[1].contains("-١٠١"));
        assert!(texts[1].contains("٥"));

        let plays = player.plays();
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].language, "en");
        assert_eq!(plays[1].language, "ar-ae");
        assert!(plays[1].started.duration_since(plays[0].started) >= CLIP + pause);
        assert!(plays.iter().all(|p| p.volume <= audio_playback::MAX_VOLUME));
    }

    #[tokio::test]
    async fn second_language_failure_still_plays_first() {
        let synth = Arc::new(MockSynthesizer::new(CLIP).fail_language("ar-ae"));
        let player = Arc::new(MockPlayer::new());
        let seq = build(
            settings(&["en", "ar-ae"]),
            synth,
            player.clone(),
            Duration::from_millis(20),
        );

        seq.submit(req("P-101", 100));
        settle(&seq).await;

        let plays = player.plays();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].language, "en");
        assert!(!seq.is_announcing());
        assert_eq!(seq.metrics().boxes_skipped.get(), 1);
    }

    #[tokio::test]
    async fn lock_released_when_every_box_fails() {
        let synth = Arc::new(
            MockSynthesizer::new(CLIP)
                .fail_language("en")
                .missing_resource("ar"),
        );
        let player = Arc::new(MockPlayer::new());
        let seq = build(settings(&["en", "ar"]), synth, player.clone(), Duration::ZERO);

        seq.submit(req("P-1", 100));
        seq.submit(req("P-2", 200));
        settle(&seq).await;

        assert!(player.plays().is_empty());
        assert_eq!(seq.metrics().batches_completed.get(), 2);
        assert_eq!(seq.submit(req("P-3", 300)), SubmitOutcome::Started);
        settle(&seq).await;
    }

    #[tokio::test]
    async fn hung_player_is_bounded_by_watchdog() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new().hang_on("en"));
        let seq = build(settings(&["en", "fr"]), synth, player.clone(), Duration::ZERO);

        seq.submit(req("P-1", 100));
        settle(&seq).await;

        let languages: Vec<_> = player.plays().into_iter().map(|p| p.language).collect();
        assert_eq!(languages, vec!["en", "fr"]);
        assert_eq!(player.active(), 0);
    }

    struct PanickingSynth;

    #[async_trait]
    impl Synthesizer for PanickingSynth {
        async fn synthesize(&self, _request: &SynthesisRequest) -> Result<AudioResource> {
            panic!("synthesizer bug")
        }

        async fn verify(&self, _resource: &AudioResource) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn panicking_collaborator_cannot_hold_the_lock() {
        let player = Arc::new(MockPlayer::new());
        let seq = build(
            settings(&["en"]),
            Arc::new(PanickingSynth),
            player,
            Duration::ZERO,
        );

        seq.submit(req("P-1", 100));
        seq.submit(req("P-2", 200));
        settle(&seq).await;
        assert!(!seq.is_announcing());
        assert_eq!(seq.current_display().unwrap().ticket_number, "P-2");
    }

    #[tokio::test]
    async fn poller_and_broadcast_deliver_same_call_once() {
        let synth = Arc::new(MockSynthesizer::new(CLIP));
        let player = Arc::new(MockPlayer::new());
        let seq = build(settings(&["en"]), synth.clone(), player, Duration::ZERO);

        let (tx, rx) = mpsc::channel(8);
        let call = req("P-101", 1_000);
        tx.send(CallEvent::new(call.clone(), CallOrigin::Broadcast))
            .await
            .unwrap();
        tx.send(CallEvent::new(call, CallOrigin::Poller)).await.unwrap();
        drop(tx);

        seq.run(rx).await;
        settle(&seq).await;
        assert_eq!(synth.requests().len(), 1);
        assert_eq!(seq.metrics().requests_stale.get(), 1);
    }
}
