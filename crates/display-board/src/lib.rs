//! display-board: what the ticket-info screen shows
//!
//! [`DisplayBoard`] mirrors the sequencer's current call into a list of
//! recent rows; [`ContentRotation`] runs the promotional slider next to it.

mod board;
pub use board::{BoardRow, DisplayBoard, DEFAULT_BOARD_ROWS};

mod rotation;
pub use rotation::{ContentRotation, MediaItem, MediaKind, DEFAULT_SLIDE_INTERVAL};
