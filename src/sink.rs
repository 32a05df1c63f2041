//! Display payload delivery.
//!
//! The downstream display keeps exactly one current state, so delivery is
//! a PUT (replace), not an append. Failures surface the response status
//! and body text; there is no internal retry. Reliability comes from the
//! next poll tick.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::models::DisplayPayload;

/// Accepts the assembled payload at the end of each cycle.
#[async_trait]
pub trait DisplaySink: Send + Sync {
    async fn deliver(&self, payload: &DisplayPayload) -> Result<()>;
}

/// HTTP PUT sink for the display endpoint.
pub struct HttpDisplaySink {
    client: reqwest::Client,
    url: String,
}

impl HttpDisplaySink {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl DisplaySink for HttpDisplaySink {
    async fn deliver(&self, payload: &DisplayPayload) -> Result<()> {
        let response = self
            .client
            .put(&self.url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("display PUT failed: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("display PUT failed: {} {}", status, body);
        }

        Ok(())
    }
}
