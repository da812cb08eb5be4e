//! HTTP transport for carrier tracking requests
//!
//! The tracking client builds a carrier-specific request and hands it to a
//! `Transport`. Production uses the reqwest implementation; tests substitute
//! canned responses. Timeouts are enforced here - exceeding them surfaces as
//! a fetch error, never a hang.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

/// How a carrier expects the tracking number delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    /// POST with form-encoded fields
    PostForm(Vec<(String, String)>),
}

/// A fully specified carrier request
#[derive(Debug, Clone)]
pub struct CarrierRequest {
    pub url: String,
    pub method: RequestMethod,
}

/// Raw response from a carrier endpoint
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &CarrierRequest) -> anyhow::Result<TransportResponse>;
}

/// reqwest-backed transport with fixed connect/read/write timeouts and an
/// identifying User-Agent header on every request
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &CarrierRequest) -> anyhow::Result<TransportResponse> {
        let builder = match &request.method {
            RequestMethod::Get => self.client.get(&request.url),
            RequestMethod::PostForm(fields) => self.client.post(&request.url).form(fields),
        };

        let response = builder.send().await.context("request failed")?;
        let status = response.status().as_u16();
        let body = response.text().await.context("failed to read response body")?;
        Ok(TransportResponse { status, body })
    }
}
