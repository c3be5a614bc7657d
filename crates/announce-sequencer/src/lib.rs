//! announce-sequencer: one announcement at a time, in call order
//!
//! The [`Sequencer`] owns the single-flight lock, the pending queue and the
//! "now displayed" call. Detectors only reach it through [`Sequencer::submit`]
//! (or the event channel consumed by [`Sequencer::run`]); the playback loop
//! only reaches it through the completion transition. Every batch ends in that
//! transition, whatever failed along the way.

mod state;
pub use state::{SequencerState, SubmitOutcome};

mod config;
pub use config::{SequencerConfig, DEFAULT_INTER_LANGUAGE_PAUSE, DEFAULT_SETTLE_DELAY};

mod metrics;
pub use metrics::SequencerMetrics;

mod playback;
pub use playback::{BatchReport, BatchRunner, SkippedBox};

mod sequencer;
pub use sequencer::Sequencer;
