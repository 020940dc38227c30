//! # Health Probe
//!
//! The network seam of the connection monitor. A probe makes one attempt
//! to reach the backend and classifies the result; the monitor adds the
//! deadline, the bookkeeping and the broadcasts.
//!
//! Any `Fn() -> impl Future<Output = Result<(), ProbeError>>` is a probe,
//! which keeps test doubles to a closure.

use crate::shared::error::ProbeError;
use crate::shared::health::HealthResponse;
use futures_util::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// One attempt to reach the health endpoint
pub trait HealthProbe: Send + Sync {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>>;
}

impl<F, Fut> HealthProbe for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        Box::pin(self())
    }
}

/// `GET <health_url>` expecting `{"status":"ok"}`
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpHealthProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            err.into()
        }
    }
}

impl HealthProbe for HttpHealthProbe {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await
                .map_err(|e| self.classify(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProbeError::HttpStatus {
                    status: status.as_u16(),
                });
            }

            let body: HealthResponse = response.json().await.map_err(|e| {
                if e.is_timeout() {
                    self.classify(e)
                } else {
                    ProbeError::InvalidBody {
                        message: e.to_string(),
                    }
                }
            })?;

            if body.is_healthy() {
                Ok(())
            } else {
                Err(ProbeError::unhealthy(body.status))
            }
        })
    }
}
