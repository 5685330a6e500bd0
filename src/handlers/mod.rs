// handlers/mod.rs - Mailchimp proxy handlers
//
// Every route takes the base64 API key as its first path segment. Routes that
// map 1:1 onto an upstream call are rows in `proxy::PROXY_ROUTES`; the modules
// below hold the ones that reshape bodies, validate fields or chain calls.

pub mod campaigns;
pub mod content;
pub mod lists;
pub mod members;
pub mod proxy;
pub mod segments;
pub mod signup_forms;
pub mod tags;
pub mod templates;
pub mod webhooks;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::mailchimp::{Credential, MailchimpClient, UpstreamError};

/// Shared handler state. Holds no per-request or per-key data.
#[derive(Clone)]
pub struct AppState {
    client: Arc<MailchimpClient>,
}

impl AppState {
    pub fn new(client: Arc<MailchimpClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        Ok(Self::new(Arc::new(MailchimpClient::from_config(&config.mailchimp)?)))
    }

    pub fn client(&self) -> &MailchimpClient {
        &self.client
    }
}

/// Decode the `:apiKey` path segment. Fails before any upstream call.
pub fn credential(encoded: &str) -> Result<Credential, ApiError> {
    Ok(Credential::from_encoded(encoded)?)
}

/// A string field counts as given only when it is non-empty.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

pub fn require<'a>(field: &'a Option<String>, message: &str) -> Result<&'a str, ApiError> {
    present(field).ok_or_else(|| ApiError::bad_request(message))
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy, containers never are.
pub fn truthy(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Elements of an array field; anything else reads as empty.
pub fn array_items(value: &Option<Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// Drop `null` object members recursively so unset optional fields are
/// omitted upstream instead of being sent as explicit nulls.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

/// JSON body extractor that tolerates an empty body (every field unset) and
/// reports malformed JSON in the proxy's own error envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
    }
}
