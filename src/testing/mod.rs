use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::mailchimp::{
    client::MailchimpClient,
    error::UpstreamError,
    transport::{Transport, UpstreamRequest, UpstreamResponse},
};

/// Scripted stand-in for the network.
///
/// Answers are consumed in push order; every request is recorded so tests can
/// assert on call counts and payloads. Running out of answers is reported as
/// a `NoResponse`, which keeps a miscounted script from hanging a loop.
#[derive(Default)]
pub struct FakeTransport {
    answers: Mutex<VecDeque<Result<UpstreamResponse, UpstreamError>>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: StatusCode, body: Value) {
        self.push(Ok(UpstreamResponse { status, body }));
    }

    pub fn push(&self, answer: Result<UpstreamResponse, UpstreamError>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.requests.lock().unwrap().push(request);
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::NoResponse("fake transport exhausted".into())))
    }
}

/// Handler state wired to a fake upstream.
pub fn fake_state(transport: Arc<FakeTransport>) -> AppState {
    let client = MailchimpClient::with_transport(AppConfig::development().mailchimp, transport);
    AppState::new(Arc::new(client))
}

/// Same, with a custom page cap for pagination tests.
pub fn fake_state_with_max_pages(transport: Arc<FakeTransport>, max_pages: usize) -> AppState {
    let mut settings = AppConfig::development().mailchimp;
    settings.max_pages = max_pages;
    let client = MailchimpClient::with_transport(settings, transport);
    AppState::new(Arc::new(client))
}

/// A page of `n` dummy records under `field`, ids continuing from `start`.
pub fn page(field: &str, start: usize, n: usize) -> Value {
    let records: Vec<Value> = (start..start + n)
        .map(|i| serde_json::json!({ "id": i.to_string() }))
        .collect();
    serde_json::json!({ field: records, "total_items": 0 })
}
