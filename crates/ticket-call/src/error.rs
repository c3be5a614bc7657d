use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failure taxonomy of the announcement pipeline.
///
/// None of these reach an operator: the sequencer logs them and moves on to the
/// next language or the next call. Stale or duplicate calls are not errors;
/// `submit` reports them through its outcome.
#[derive(Debug, Error)]
pub enum Error {
    #[error("voice settings unavailable: {0}")]
    SettingsUnavailable(String),
    #[error("synthesis unavailable: {0}")]
    SynthesisUnavailable(String),
    #[error("audio resource not found: {0}")]
    ResourceNotFound(String),
    #[error("playback timed out after {0:?}")]
    PlaybackTimeout(Duration),
    #[error("playback error: {0}")]
    PlaybackError(String),
    #[error("detector transport error: {0}")]
    DetectorTransport(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
