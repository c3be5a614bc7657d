//! ticket-call: shared call model for the announcement pipeline
//!
//! Every other crate in the workspace speaks in terms of the types defined here:
//! the [`AnnouncementRequest`] produced by detectors, the [`CallEvent`] envelope
//! that carries it into the sequencer, and the [`Error`] taxonomy.

mod types;
pub use types::{
    now_millis, ticket_key, to_millis, AnnouncementRequest, CallEvent, CallOrigin, DisplayedCall,
    UNASSIGNED_COUNTER,
};

mod error;
pub use error::{Error, Result};
