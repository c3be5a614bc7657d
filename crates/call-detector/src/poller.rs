use crate::snapshot::latest_call;
use crate::source::CalledTicketSource;
use std::sync::Arc;
use std::time::Duration;
use ticket_call::{AnnouncementRequest, CallEvent, CallOrigin, Result};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Fixed-interval reader of the backend's called-ticket list.
///
/// Keeps polling while announcements play; the sequencer decides what to do
/// with repeated deliveries.
pub struct Poller {
    source: Arc<dyn CalledTicketSource>,
    interval: Duration,
    events: mpsc::Sender<CallEvent>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn CalledTicketSource>,
        interval: Duration,
        events: mpsc::Sender<CallEvent>,
    ) -> Self {
        Self {
            source,
            interval,
            events,
        }
    }

    /// Fetch once and return the most recent call, if any.
    pub async fn poll_once(&self) -> Result<Option<AnnouncementRequest>> {
        let tickets = self.source.called_tickets().await?;
        Ok(latest_call(tickets))
    }

    /// Poll until the sequencer side of the channel goes away.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(Some(request)) => {
                    let event = CallEvent::new(request, CallOrigin::Poller);
                    if self.events.send(event).await.is_err() {
                        debug!("sequencer gone, poller stopping");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "poll failed, retrying next tick"),
            }
        }
    }
}
