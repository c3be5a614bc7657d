//! call-detector: the input side of the announcement pipeline
//!
//! Three sources feed one sequencer channel:
//! - [`Poller`] reads the backend's called-ticket list on a fixed interval
//! - [`listen`] forwards push notices from a [`CallFeed`] (UDP datagrams)
//! - [`replay_last_call`] submits the durable last-call record once at start-up
//!
//! Delivery may repeat; de-duplication happens in the sequencer.

mod snapshot;
pub use snapshot::{build_snapshot, latest_call, CalledAt, CalledTicket};

mod source;
pub use source::{CalledTicketSource, HttpCalledTicketSource};

mod poller;
pub use poller::{Poller, DEFAULT_POLL_INTERVAL};

mod broadcast;
pub use broadcast::{listen, CallFeed, UdpCallFeed, UdpCallPublisher};

mod last_call;
pub use last_call::{replay_last_call, LastCallStore};
