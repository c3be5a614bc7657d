use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Counter placeholder used by the backend when a ticket has no counter yet.
pub const UNASSIGNED_COUNTER: &str = "N/A";

/// One "ticket was called" event.
///
/// The same shape travels on the `ticket-calls` broadcast topic and is stored
/// as the durable last-call record, hence the camelCase wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRequest {
    pub ticket_number: String,
    #[serde(default = "unassigned_counter")]
    pub counter_number: String,
    /// Milliseconds since the Unix epoch.
    pub called_at_timestamp: i64,
}

fn unassigned_counter() -> String {
    UNASSIGNED_COUNTER.to_string()
}

impl AnnouncementRequest {
    pub fn new(
        ticket_number: impl Into<String>,
        counter_number: impl Into<String>,
        called_at_timestamp: i64,
    ) -> Self {
        let counter_number = counter_number.into();
        let counter_number = if counter_number.trim().is_empty() {
            unassigned_counter()
        } else {
            counter_number.trim().to_string()
        };
        Self {
            ticket_number: ticket_number.into().trim().to_string(),
            counter_number,
            called_at_timestamp,
        }
    }

    /// Identity key used for de-duplication.
    pub fn key(&self) -> String {
        ticket_key(&self.ticket_number)
    }

    /// True when both requests refer to the same ticket.
    pub fn same_event(&self, other: &AnnouncementRequest) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for AnnouncementRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> counter {} @{}",
            self.ticket_number, self.counter_number, self.called_at_timestamp
        )
    }
}

/// Case-insensitive, whitespace-insensitive ticket identity.
pub fn ticket_key(ticket_number: &str) -> String {
    ticket_number.trim().to_lowercase()
}

/// Where a call event came from. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallOrigin {
    Poller,
    Broadcast,
    LastCallSnapshot,
}

impl fmt::Display for CallOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallOrigin::Poller => "poller",
            CallOrigin::Broadcast => "broadcast",
            CallOrigin::LastCallSnapshot => "last_call_snapshot",
        };
        f.write_str(s)
    }
}

/// A request tagged with its producer, as sent through the detector channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    pub request: AnnouncementRequest,
    pub origin: CallOrigin,
}

impl CallEvent {
    pub fn new(request: AnnouncementRequest, origin: CallOrigin) -> Self {
        Self { request, origin }
    }
}

/// What the display shows as the current call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedCall {
    pub ticket_number: String,
    pub counter_number: String,
    pub called_at_timestamp: i64,
}

impl From<&AnnouncementRequest> for DisplayedCall {
    fn from(req: &AnnouncementRequest) -> Self {
        Self {
            ticket_number: req.ticket_number.clone(),
            counter_number: req.counter_number.clone(),
            called_at_timestamp: req.called_at_timestamp,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    to_millis(OffsetDateTime::now_utc())
}

pub fn to_millis(ts: OffsetDateTime) -> i64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as i64
}
