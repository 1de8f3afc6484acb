//! HTTP transport for provider requests.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::commit::RequestPayload;
use crate::error::TransportError;

/// Posts a JSON body and returns the raw response text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &RequestPayload,
    ) -> Result<String, TransportError>;
}

/// `reqwest`-backed transport with a fixed deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &RequestPayload,
    ) -> Result<String, TransportError> {
        debug!("Making request to: {} (timeout {}s)", url, self.timeout.as_secs());

        let mut request = self.client.post(url).timeout(self.timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        // Headers first: `json` only sets Content-Type when it is absent.
        let request = request.json(body);

        let request_err = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(request_err)?;
        let status = response.status();
        let text = response.text().await.map_err(request_err)?;

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("Response status {}, {} bytes", status, text.len());
        Ok(text)
    }
}
