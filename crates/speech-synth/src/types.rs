use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One box worth of speech to synthesize.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_identity: String,
    #[serde(rename = "speed")]
    pub rate: f32,
    pub pitch: f32,
    pub language: String,
}

/// A playable clip returned by the synthesis service.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioResource {
    /// Absolute, cache-busted URL.
    pub url: String,
    /// Clip length when the service reports it.
    pub duration: Option<Duration>,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SynthesisResponse {
    pub audio_url: Option<String>,
    pub duration_ms: Option<u64>,
}
