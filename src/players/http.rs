use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use super::Transport;
use crate::config::Config;
use crate::error::{SqueezeError, SqueezeResult};

/// Squeezebox server JSON-RPC over HTTP
pub struct HttpTransport {
    client: Client,
    retries: usize,
    retry_interval: Duration,
}

impl HttpTransport {
    pub fn new(config: &Config) -> SqueezeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            retries: config.request_retries,
            retry_interval: Duration::from_millis(config.retry_interval_ms),
        })
    }

    async fn post_once(&self, url: &str, payload: &Value) -> Result<Value, reqwest::Error> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        response.json::<Value>().await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, payload: &Value) -> SqueezeResult<Value> {
        let strategy = FixedInterval::new(self.retry_interval).take(self.retries);
        let mut attempt = 0usize;

        let result = RetryIf::spawn(
            strategy,
            || self.post_once(url, payload),
            |e: &reqwest::Error| {
                attempt += 1;
                let transient = e.is_connect() || e.is_timeout();
                if transient && attempt <= self.retries {
                    warn!(
                        "⚠️ Server retry {}/{} for {}: {}",
                        attempt, self.retries, url, e
                    );
                }
                transient
            },
        )
        .await;

        match result {
            Ok(value) => {
                debug!("slim.request <- {}", value);
                Ok(value)
            }
            Err(e) if e.is_connect() => Err(SqueezeError::Player(format!(
                "Could not reach the server at {}. Is it running?",
                url
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
