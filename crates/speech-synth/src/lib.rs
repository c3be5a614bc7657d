//! speech-synth: per-language speech synthesis for announcement boxes
//!
//! The synthesis service itself is external. This crate posts the localized
//! sentence, normalizes the returned audio URL, and checks the clip can be
//! fetched before it is handed to a player.

mod types;
pub use types::{AudioResource, SynthesisRequest};

mod traits;
pub use traits::Synthesizer;

pub mod http;
pub use http::{normalize_audio_url, HttpSynthesizer};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::MockSynthesizer;
