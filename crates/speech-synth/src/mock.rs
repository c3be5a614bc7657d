//! Mock synthesizer with per-language failure injection

use crate::{AudioResource, SynthesisRequest, Synthesizer};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use ticket_call::{Error, Result};

pub struct MockSynthesizer {
    clip_duration: Duration,
    latency: Duration,
    unavailable: HashSet<String>,
    missing: HashSet<String>,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl MockSynthesizer {
    pub fn new(clip_duration: Duration) -> Self {
        Self {
            clip_duration,
            latency: Duration::ZERO,
            unavailable: HashSet::new(),
            missing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Simulated round-trip time of each synthesis call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Synthesis for `language` fails with `SynthesisUnavailable`.
    pub fn fail_language(mut self, language: &str) -> Self {
        self.unavailable.insert(language.to_string());
        self
    }

    /// Synthesis for `language` succeeds but the pre-flight check fails.
    pub fn missing_resource(mut self, language: &str) -> Self {
        self.missing.insert(language.to_string());
        self
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioResource> {
        self.requests.lock().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.unavailable.contains(&request.language) {
            return Err(Error::SynthesisUnavailable(format!(
                "mock: no voice for {}",
                request.language
            )));
        }
        Ok(AudioResource {
            url: format!("mock://{}/{}", request.language, request.text.len()),
            duration: Some(self.clip_duration),
            language: request.language.clone(),
        })
    }

    async fn verify(&self, resource: &AudioResource) -> Result<()> {
        if self.missing.contains(&resource.language) {
            return Err(Error::ResourceNotFound(resource.url.clone()));
        }
        Ok(())
    }
}
