use crate::types::{VoiceSettings, VoiceSettingsResponse};
use async_trait::async_trait;
use std::time::Duration;
use ticket_call::{now_millis, Error, Result};

/// Anything that can produce the current voice profile of a tenant.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn fetch(&self, tenant_id: &str) -> Result<VoiceSettings>;
}

/// `GET {base}/voice-settings?tenantId=..&t=..` against the admin backend.
pub struct HttpSettingsSource {
    base_url: String,
    client: reqwest::Client,
    api_token: Option<String>,
}

impl HttpSettingsSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            api_token: None,
        })
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }
}

#[async_trait]
impl SettingsSource for HttpSettingsSource {
    async fn fetch(&self, tenant_id: &str) -> Result<VoiceSettings> {
        let url = format!("{}/voice-settings", self.base_url);
        let cache_bust = now_millis().to_string();

        let mut request = self
            .client
            .get(&url)
            .query(&[("tenantId", tenant_id), ("t", cache_bust.as_str())]);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::SettingsUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::SettingsUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: VoiceSettingsResponse = response
            .json()
            .await
            .map_err(|e| Error::SettingsUnavailable(format!("decoding body: {e}")))?;
        Ok(body.into())
    }
}
