use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

use super::credential::Credential;
use super::error::UpstreamError;
use super::transport::{ReqwestTransport, Transport, UpstreamRequest};
use crate::config::MailchimpConfig;

/// Upstream path below the versioned API root, kept as raw segments so that
/// caller-supplied identifiers are percent-encoded instead of spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath(Vec<String>);

impl ApiPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// A single upstream call before credentials and host are applied.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: ApiPath,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Call {
    pub fn new(method: Method, path: ApiPath) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: ApiPath) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: ApiPath) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: ApiPath, body: Value) -> Self {
        Self::new(Method::POST, path).body(body)
    }

    pub fn put(path: ApiPath, body: Value) -> Self {
        Self::new(Method::PUT, path).body(body)
    }

    pub fn patch(path: ApiPath, body: Value) -> Self {
        Self::new(Method::PATCH, path).body(body)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Authenticated access to the Mailchimp Marketing API for any key.
///
/// The client holds no per-key state: every call receives the resolved
/// [`Credential`], derives the regional host from it and authenticates with
/// basic auth (placeholder username, key as password).
pub struct MailchimpClient {
    transport: Arc<dyn Transport>,
    settings: MailchimpConfig,
}

impl MailchimpClient {
    pub fn from_config(settings: &MailchimpConfig) -> Result<Self, UpstreamError> {
        let transport = ReqwestTransport::new(settings.request_timeout())?;
        Ok(Self::with_transport(settings.clone(), Arc::new(transport)))
    }

    pub fn with_transport(settings: MailchimpConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, settings }
    }

    pub fn settings(&self) -> &MailchimpConfig {
        &self.settings
    }

    /// Resolve the absolute URL for a call made with `credential`.
    pub fn endpoint(&self, credential: &Credential, call: &Call) -> Result<Url, UpstreamError> {
        let base = self.settings.api_base.replace("{dc}", credential.data_center());
        let mut url = Url::parse(&base)
            .map_err(|e| UpstreamError::Request(format!("invalid API base {}: {}", base, e)))?;

        url.path_segments_mut()
            .map_err(|_| UpstreamError::Request(format!("API base {} cannot carry a path", base)))?
            .pop_if_empty()
            .extend(call.path.segments());

        if !call.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&call.query);
        }

        Ok(url)
    }

    /// Perform exactly one upstream call and return the body of a 2xx answer.
    pub async fn send(&self, credential: &Credential, call: Call) -> Result<Value, UpstreamError> {
        let url = self.endpoint(credential, &call)?;
        tracing::debug!("Mailchimp {} {} (dc={})", call.method, call.path, credential.data_center());

        let request = UpstreamRequest {
            method: call.method.clone(),
            url,
            username: self.settings.auth_username.clone(),
            password: credential.secret().to_string(),
            body: call.body,
        };

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Mailchimp {} {} failed: {}", call.method, call.path, e);
                return Err(e);
            }
        };

        if response.status.is_success() {
            return Ok(response.body);
        }

        let detail = rejection_detail(&response.body);
        tracing::warn!(
            "Mailchimp {} {} rejected with {}: {}",
            call.method,
            call.path,
            response.status,
            detail
        );
        Err(UpstreamError::Rejected {
            status: response.status,
            detail,
            body: response.body,
        })
    }
}

/// Mailchimp error bodies follow RFC 7807; `detail` is the readable part.
pub fn rejection_detail(body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .unwrap_or("Unknown error")
        .to_string()
}
