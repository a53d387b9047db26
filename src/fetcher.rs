use axum::body::Bytes;
use axum::http::StatusCode;
use serde::de::IgnoredAny;
use std::time::Duration;
use thiserror::Error;

use crate::validator::ServerAddress;

/// Why a players.json fetch produced nothing to relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Unreachable(String),
    #[error("upstream responded with status {}", .0.as_u16())]
    UpstreamStatus(StatusCode),
    #[error("upstream did not return JSON")]
    InvalidBody,
    #[error("upstream response exceeds {0} bytes")]
    BodyTooLarge(usize),
}

impl FetchError {
    /// Status relayed to the caller. Upstream codes pass through untouched.
    pub fn status(&self) -> StatusCode {
        match self {
            FetchError::Unreachable(_) | FetchError::InvalidBody | FetchError::BodyTooLarge(_) => {
                StatusCode::BAD_GATEWAY
            }
            FetchError::UpstreamStatus(code) => *code,
        }
    }
}

// Single shot, time bounded GET of players.json. No retries.
pub struct PlayerFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body: usize,
}

impl PlayerFetcher {
    pub fn new(timeout: Duration, max_body: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            timeout,
            max_body,
        })
    }

    /// Returns the upstream body unmodified once it is known to be valid JSON.
    pub async fn fetch(&self, addr: &ServerAddress) -> Result<Bytes, FetchError> {
        let url = addr.players_url();

        let res = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.unreachable(&url, e))?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Upstream returned an error status");
            let code = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            return Err(FetchError::UpstreamStatus(code));
        }

        let body = self.read_body(&url, res).await?;

        if serde_json::from_slice::<IgnoredAny>(&body).is_err() {
            tracing::debug!(url = %url, len = body.len(), "Upstream body is not JSON");
            return Err(FetchError::InvalidBody);
        }

        Ok(body)
    }

    // Buffers at most `max_body` bytes, however long the upstream keeps streaming
    async fn read_body(&self, url: &str, mut res: reqwest::Response) -> Result<Bytes, FetchError> {
        if res.content_length().is_some_and(|len| len > self.max_body as u64) {
            tracing::debug!(url = %url, len = ?res.content_length(), "Upstream body too large");
            return Err(FetchError::BodyTooLarge(self.max_body));
        }

        let mut buf = Vec::new();
        while let Some(chunk) = res.chunk().await.map_err(|e| self.unreachable(url, e))? {
            if buf.len() + chunk.len() > self.max_body {
                tracing::debug!(url = %url, "Upstream body too large");
                return Err(FetchError::BodyTooLarge(self.max_body));
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(buf))
    }

    // Transport details go to the log only
    fn unreachable(&self, url: &str, e: reqwest::Error) -> FetchError {
        tracing::debug!(url = %url, error = %e, "Upstream request failed");

        let reason = if e.is_timeout() {
            format!("timed out after {}s", self.timeout.as_secs())
        } else if e.is_connect() {
            "connection failed".to_string()
        } else {
            "request failed".to_string()
        };
        FetchError::Unreachable(reason)
    }
}
