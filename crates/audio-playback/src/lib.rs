//! audio-playback: plays synthesized announcement clips
//!
//! Players implement [`AudioPlayer`]. The sequencer never calls a player
//! directly; it goes through [`PlaybackWatchdog::play`], which turns natural
//! end, player error and timeout into a [`PlaybackOutcome`] so a single bad
//! clip cannot stall the announcement loop.

mod types;
pub use types::{PlaybackOptions, PlaybackOutcome, MAX_VOLUME};

mod traits;
pub use traits::AudioPlayer;

mod watchdog;
pub use watchdog::{
    PlaybackWatchdog, DEFAULT_CLIP_ESTIMATE, DEFAULT_PLAYBACK_BUFFER, MIN_STRETCH_RATE,
};

pub mod command;
pub use command::{CommandPlayer, PlayerKind};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{MockPlayer, PlayRecord};
