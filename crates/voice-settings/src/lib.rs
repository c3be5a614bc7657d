//! voice-settings: resolves the tenant's announcement voice profile
//!
//! Settings are fetched fresh for every announcement batch. A stale copy is
//! kept only as a fallback for when the admin backend cannot be reached.

mod types;
pub use types::{
    ResolvedSettings, SettingsOrigin, VoiceSettings, VoiceSettingsResponse, DEFAULT_LANGUAGE,
    DEFAULT_SPEECH_PITCH, DEFAULT_SPEECH_RATE, DEFAULT_VOICE, MAX_BOXES, SPEECH_PITCH_RANGE,
    SPEECH_RATE_RANGE,
};

mod source;
pub use source::{HttpSettingsSource, SettingsSource};

mod cache;
pub use cache::FallbackCache;

mod resolver;
pub use resolver::SettingsResolver;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::MockSettingsSource;
