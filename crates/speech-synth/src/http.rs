//! HTTP client for the tenant's speech-synthesis endpoint.

use crate::types::SynthesisResponse;
use crate::{AudioResource, SynthesisRequest, Synthesizer};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use ticket_call::{now_millis, Error, Result};

pub struct HttpSynthesizer {
    base_url: Url,
    client: reqwest::Client,
    api_token: Option<String>,
}

impl HttpSynthesizer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url,
            client,
            api_token: None,
        })
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join("synthesize")
            .map_err(|e| Error::Config(format!("synthesis endpoint: {e}")))
    }
}

/// Parse the service base URL, making sure it ends with `/` so relative
/// joins stay under it.
fn parse_base(base_url: &str) -> Result<Url> {
    let mut raw = base_url.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| Error::Config(format!("invalid base url '{base_url}': {e}")))
}

/// Turn whatever the service returned into an absolute, cache-busted URL.
///
/// Absolute URLs are kept, `/path` resolves against the service origin and
/// bare relative paths against the base URL.
pub fn normalize_audio_url(base: &Url, raw: &str, cache_bust: i64) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::SynthesisUnavailable(
            "service returned an empty audio url".into(),
        ));
    }
    let mut url = base
        .join(raw)
        .map_err(|e| Error::SynthesisUnavailable(format!("bad audio url '{raw}': {e}")))?;
    url.query_pairs_mut()
        .append_pair("t", &cache_bust.to_string());
    Ok(url)
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioResource> {
        let mut req = self.client.post(self.endpoint()?).json(request);
        if let Some(ref token) = self.api_token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::SynthesisUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| Error::SynthesisUnavailable(format!("decoding body: {e}")))?;
        let url = normalize_audio_url(
            &self.base_url,
            body.audio_url.as_deref().unwrap_or_default(),
            now_millis(),
        )?;

        tracing::debug!(language = %request.language, url = %url, "synthesized announcement");
        Ok(AudioResource {
            url: url.to_string(),
            duration: body.duration_ms.map(Duration::from_millis),
            language: request.language.clone(),
        })
    }

    async fn verify(&self, resource: &AudioResource) -> Result<()> {
        let response = self
            .client
            .head(&resource.url)
            .send()
            .await
            .map_err(|e| Error::ResourceNotFound(format!("{}: {e}", resource.url)))?;

        // Some static file servers refuse HEAD; retry with a plain GET.
        let status = if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            self.client
                .get(&resource.url)
                .send()
                .await
                .map_err(|e| Error::ResourceNotFound(format!("{}: {e}", resource.url)))?
                .status()
        } else {
            response.status()
        };

        if status.is_success() {
            Ok(())
        } else {
            Err(Error::ResourceNotFound(format!(
                "{}: HTTP {status}",
                resource.url
            )))
        }
    }
}
