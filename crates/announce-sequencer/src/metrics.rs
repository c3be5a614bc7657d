use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct SequencerMetrics {
    pub registry: Registry,
    pub batches_started: IntCounter,
    pub batches_completed: IntCounter,
    pub requests_queued: IntCounter,
    pub requests_stale: IntCounter,
    pub requests_duplicate: IntCounter,
    pub boxes_played: IntCounter,
    pub boxes_skipped: IntCounter,
    pub queue_depth: IntGauge,
}

impl SequencerMetrics {
    pub fn new() -> Result<Self, String> {
        fn counter(name: &str, help: &str) -> Result<IntCounter, String> {
            IntCounter::new(name, help).map_err(|e| format!("metrics init error: {e}"))
        }

        let registry = Registry::new();
        let metrics = Self {
            batches_started: counter("qa_batches_started", "Announcement batches started")?,
            batches_completed: counter(
                "qa_batches_completed",
                "Announcement batches that reached the completion transition",
            )?,
            requests_queued: counter("qa_requests_queued", "Calls queued behind an active batch")?,
            requests_stale: counter("qa_requests_stale", "Calls rejected as stale")?,
            requests_duplicate: counter(
                "qa_requests_duplicate",
                "Calls rejected because the ticket was already active or queued",
            )?,
            boxes_played: counter("qa_boxes_played", "Language boxes played to completion")?,
            boxes_skipped: counter(
                "qa_boxes_skipped",
                "Language boxes skipped after a synthesis or playback failure",
            )?,
            queue_depth: IntGauge::new("qa_queue_depth", "Calls waiting behind the active batch")
                .map_err(|e| format!("metrics init error: {e}"))?,
            registry,
        };

        let _ = metrics.registry.register(Box::new(metrics.batches_started.clone()));
        let _ = metrics.registry.register(Box::new(metrics.batches_completed.clone()));
        let _ = metrics.registry.register(Box::new(metrics.requests_queued.clone()));
        let _ = metrics.registry.register(Box::new(metrics.requests_stale.clone()));
        let _ = metrics.registry.register(Box::new(metrics.requests_duplicate.clone()));
        let _ = metrics.registry.register(Box::new(metrics.boxes_played.clone()));
        let _ = metrics.registry.register(Box::new(metrics.boxes_skipped.clone()));
        let _ = metrics.registry.register(Box::new(metrics.queue_depth.clone()));
        Ok(metrics)
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_registered_counters() {
        let m = SequencerMetrics::new().unwrap();
        m.boxes_played.inc();
        m.queue_depth.set(3);
        let text = m.encode_text();
        assert!(text.contains("qa_boxes_played 1"));
        assert!(text.contains("qa_queue_depth 3"));
    }
}
