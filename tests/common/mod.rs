#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use httpmock::MockServer;
use serde_json::Value;
use tower::ServiceExt;

use mailchimp_proxy::{app::app, config::AppConfig, handlers::AppState, mailchimp::Credential};

/// Raw key whose data center is `us6`.
pub const API_KEY: &str = "0123456789abcdef-us6";

/// The proxy router wired to a local stand-in for the Mailchimp API.
pub struct TestApp {
    pub upstream: MockServer,
    router: Router,
}

impl TestApp {
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(adjust: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let upstream = MockServer::start_async().await;

        let mut config = AppConfig::development();
        config.mailchimp.api_base = format!("{}/3.0", upstream.base_url());
        config.mailchimp.request_timeout_secs = 5;
        config.api.enable_request_logging = false;
        adjust(&mut config);

        let state = AppState::from_config(&config).context("failed to build upstream client")?;
        let router = app(&config, state);
        Ok(Self { upstream, router })
    }

    /// Send one request through the router; returns the status and JSON body
    /// (`Null` for an empty body).
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, uri, None).await
    }
}

/// The key as it appears in proxy URLs.
pub fn encoded_key() -> String {
    Credential::encode(API_KEY)
}

/// Lower-case hex MD5 of the lower-cased email.
pub fn hash(email: &str) -> String {
    mailchimp_proxy::mailchimp::subscriber_hash(email)
}
