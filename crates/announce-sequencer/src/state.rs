use std::collections::VecDeque;
use ticket_call::{AnnouncementRequest, DisplayedCall};

/// Result of handing a request to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Became the active batch; the display already shows it.
    Started,
    /// Waiting behind the active batch at `position` (0 = next).
    Queued { position: usize },
    /// The ticket is already active or queued.
    Duplicate,
    /// `called_at_timestamp` is not newer than the last accepted call.
    Stale,
}

/// Mutable state of one display's announcement pipeline.
///
/// Only [`SequencerState::accept`] and [`SequencerState::finish_batch`] move it
/// between Idle and Announcing.
#[derive(Debug, Default, Clone)]
pub struct SequencerState {
    is_announcing: bool,
    active: Option<AnnouncementRequest>,
    pending: VecDeque<AnnouncementRequest>,
    currently_displayed: Option<DisplayedCall>,
    last_accepted_timestamp: Option<i64>,
}

impl SequencerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_announcing(&self) -> bool {
        self.is_announcing
    }

    pub fn active(&self) -> Option<&AnnouncementRequest> {
        self.active.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &AnnouncementRequest> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn currently_displayed(&self) -> Option<&DisplayedCall> {
        self.currently_displayed.as_ref()
    }

    pub fn last_accepted_timestamp(&self) -> Option<i64> {
        self.last_accepted_timestamp
    }

    pub fn accept(&mut self, request: AnnouncementRequest) -> SubmitOutcome {
        if matches!(self.last_accepted_timestamp, Some(last) if request.called_at_timestamp <= last)
        {
            return SubmitOutcome::Stale;
        }

        if !self.is_announcing {
            self.start(request);
            return SubmitOutcome::Started;
        }

        let already_known = self
            .active
            .iter()
            .chain(self.pending.iter())
            .any(|r| r.same_event(&request));
        if already_known {
            return SubmitOutcome::Duplicate;
        }

        // Keep the queue in call order; equal timestamps stay in arrival order.
        let position = self
            .pending
            .iter()
            .position(|r| r.called_at_timestamp > request.called_at_timestamp)
            .unwrap_or(self.pending.len());
        self.pending.insert(position, request);
        SubmitOutcome::Queued { position }
    }

    /// Close the active batch. Returns the next request, already displayed,
    /// or `None` when the sequencer went idle.
    pub fn finish_batch(&mut self) -> Option<AnnouncementRequest> {
        self.active = None;
        match self.pending.pop_front() {
            Some(next) => {
                self.start(next.clone());
                Some(next)
            }
            None => {
                self.is_announcing = false;
                None
            }
        }
    }

    /// Drop the lock without touching the queue.
    pub fn release(&mut self) {
        self.is_announcing = false;
        self.active = None;
    }

    fn start(&mut self, request: AnnouncementRequest) {
        self.is_announcing = true;
        self.currently_displayed = Some(DisplayedCall::from(&request));
        self.last_accepted_timestamp = Some(
            self.last_accepted_timestamp
                .map_or(request.called_at_timestamp, |last| {
                    last.max(request.called_at_timestamp)
                }),
        );
        self.active = Some(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(ticket: &str, ts: i64) -> AnnouncementRequest {
        AnnouncementRequest::new(ticket, "5", ts)
    }

    #[test]
    fn idle_request_starts_and_displays() {
        let mut st = SequencerState::new();
        assert_eq!(st.accept(req("P-101", 100)), SubmitOutcome::Started);
        assert!(st.is_announcing());
        assert_eq!(st.currently_displayed().unwrap().ticket_number, "P-101");
        assert_eq!(st.last_accepted_timestamp(), Some(100));
    }

    #[test]
    fn busy_requests_queue_without_display_change() {
        let mut st = SequencerState::new();
        st.accept(req("P-101", 100));
        assert_eq!(
            st.accept(req("P-102", 200)),
            SubmitOutcome::Queued { position: 0 }
        );
        assert_eq!(st.currently_displayed().unwrap().ticket_number, "P-101");
        assert_eq!(st.last_accepted_timestamp(), Some(100));
    }

    #[test]
    fn stale_and_duplicate_are_rejected() {
        let mut st = SequencerState::new();
        st.accept(req("P-101", 100));
        assert_eq!(st.accept(req("P-999", 100)), SubmitOutcome::Stale);
        assert_eq!(st.accept(req("P-999", 50)), SubmitOutcome::Stale);
        assert_eq!(st.accept(req(" p-101 ", 150)), SubmitOutcome::Duplicate);
        st.accept(req("P-102", 200));
        assert_eq!(st.accept(req("P-102", 250)), SubmitOutcome::Duplicate);
        assert_eq!(st.pending_len(), 1);
    }

    #[test]
    fn queue_is_ordered_by_call_time() {
        let mut st = SequencerState::new();
        st.accept(req("R1", 100));
        st.accept(req("R3", 300));
        assert_eq!(
            st.accept(req("R2", 200)),
            SubmitOutcome::Queued { position: 0 }
        );
        assert_eq!(
            st.accept(req("R4", 300)),
            SubmitOutcome::Queued { position: 2 }
        );
        let order: Vec<_> = st.pending().map(|r| r.ticket_number.clone()).collect();
        assert_eq!(order, vec!["R2", "R3", "R4"]);
    }

    #[test]
    fn finish_drains_then_idles() {
        let mut st = SequencerState::new();
        st.accept(req("R1", 100));
        st.accept(req("R2", 200));

        let next = st.finish_batch().unwrap();
        assert_eq!(next.ticket_number, "R2");
        assert_eq!(st.currently_displayed().unwrap().ticket_number, "R2");
        assert_eq!(st.last_accepted_timestamp(), Some(200));
        assert!(st.is_announcing());

        assert!(st.finish_batch().is_none());
        assert!(!st.is_announcing());
        // The last call stays on screen after the audio ends.
        assert_eq!(st.currently_displayed().unwrap().ticket_number, "R2");
    }

    #[test]
    fn recall_after_idle_starts_again() {
        let mut st = SequencerState::new();
        st.accept(req("R1", 100));
        st.finish_batch();
        assert_eq!(st.accept(req("R1", 100)), SubmitOutcome::Stale);
        assert_eq!(st.accept(req("R1", 400)), SubmitOutcome::Started);
    }
}
