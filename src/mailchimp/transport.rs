use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::error::UpstreamError;

/// One fully-built outbound call. The URL already carries any query string.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub username: String,
    pub password: String,
    pub body: Option<Value>,
}

/// Whatever the upstream answered, successful or not.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// The seam between the proxy and the network.
///
/// Implementations only move bytes; deciding whether a status is a failure is
/// left to [`super::client::MailchimpClient`]. Errors returned here are always
/// either [`UpstreamError::NoResponse`] or [`UpstreamError::Request`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mailchimp-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .basic_auth(request.username, Some(request.password));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::NoResponse(e.to_string()))?;

        Ok(UpstreamResponse {
            status,
            body: parse_body(&text),
        })
    }
}

/// Builder failures never touched the network; everything else did.
fn classify_send_error(err: reqwest::Error) -> UpstreamError {
    if err.is_builder() {
        UpstreamError::Request(err.to_string())
    } else {
        UpstreamError::NoResponse(err.to_string())
    }
}

/// Empty bodies (204s) become `null`, non-JSON bodies are kept as text.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
