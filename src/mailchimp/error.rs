use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failures of a call (or a chain of calls) against the upstream API.
#[derive(Debug, Error, Clone)]
pub enum UpstreamError {
    /// The upstream answered with a non-2xx status. `body` is the problem
    /// document as received.
    #[error("Mailchimp rejected the request ({status}): {detail}")]
    Rejected {
        status: StatusCode,
        detail: String,
        body: Value,
    },

    /// Sent, but nothing usable came back (connect failure, timeout, reset).
    #[error("No response received from Mailchimp API: {0}")]
    NoResponse(String),

    /// The request could not be built or issued at all.
    #[error("Error setting up request to Mailchimp API: {0}")]
    Request(String),

    /// A 2xx answer that lacks a field the caller depends on.
    #[error("Unexpected response from Mailchimp API: {0}")]
    UnexpectedBody(String),

    #[error("Pagination stopped after {0} pages without reaching the end")]
    PageLimit(usize),
}

impl UpstreamError {
    /// Rewrite the detail of a rejection, leaving other kinds untouched.
    pub fn map_detail(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            UpstreamError::Rejected { status, detail, body } => UpstreamError::Rejected {
                status,
                detail: f(detail),
                body,
            },
            other => other,
        }
    }
}
