use crate::snapshot::CalledTicket;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use ticket_call::{Error, Result};

/// Backend view of the tickets currently marked as called.
#[async_trait]
pub trait CalledTicketSource: Send + Sync {
    async fn called_tickets(&self) -> Result<Vec<CalledTicket>>;
}

/// Older backends wrap the list; accept all three shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum CalledTicketsBody {
    List(Vec<CalledTicket>),
    Tickets { tickets: Vec<CalledTicket> },
    Data { data: Vec<CalledTicket> },
}

impl From<CalledTicketsBody> for Vec<CalledTicket> {
    fn from(body: CalledTicketsBody) -> Self {
        match body {
            CalledTicketsBody::List(list) => list,
            CalledTicketsBody::Tickets { tickets } => tickets,
            CalledTicketsBody::Data { data } => data,
        }
    }
}

/// `GET {base}/called-tickets`, bearer authenticated.
pub struct HttpCalledTicketSource {
    base_url: String,
    client: reqwest::Client,
    api_token: Option<String>,
}

impl HttpCalledTicketSource {
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
impl CalledTicketSource for HttpCalledTicketSource {
    async fn called_tickets(&self) -> Result<Vec<CalledTicket>> {
        let url = format!("{}/called-tickets", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::DetectorTransport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::DetectorTransport(format!(
                "called-tickets: HTTP {}",
                response.status()
            )));
        }

        let body: CalledTicketsBody = response
            .json()
            .await
            .map_err(|e| Error::DetectorTransport(format!("called-tickets body: {e}")))?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn reads_plain_and_wrapped_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/called-tickets"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"ticketNumber":"P-1","counterNumber":"2","status":"called","calledAt":10}]}"#,
            ))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/called-tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"ticketNumber":"P-2","counterNumber":"3","status":"called","calledAt":20}]"#,
            ))
            .with_priority(2)
            .mount(&server)
            .await;

        let anon = HttpCalledTicketSource::new(&server.uri(), Duration::from_secs(2)).unwrap();
        let plain = anon.called_tickets().await.unwrap();
        assert_eq!(plain[0].ticket_number, "P-2");

        let authed = HttpCalledTicketSource::new(&server.uri(), Duration::from_secs(2))
            .unwrap()
            .with_api_token(Some("tok".into()));
        let wrapped = authed.called_tickets().await.unwrap();
        assert_eq!(wrapped[0].ticket_number, "P-1");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn server_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let source = HttpCalledTicketSource::new(&server.uri(), Duration::from_secs(2)).unwrap();
        assert!(matches!(
            source.called_tickets().await,
            Err(Error::DetectorTransport(_))
        ));
    }
}
