use axum::response::{IntoResponse, Json, Response};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// How a successful upstream body is wrapped for the frontend.
///
/// Success is always 200 regardless of the upstream's own 2xx code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// `{ "data": body }`
    Data,
    /// `{ "message": msg }`, body dropped
    Message(&'static str),
    /// `{ "message": msg, "data": body }`
    MessageData(&'static str),
    /// `{ "message": msg, <key>: body }`
    MessageKeyed(&'static str, &'static str),
    /// `{ <key>: body }`
    Keyed(&'static str),
    /// The upstream body as-is
    Raw,
}

impl Reply {
    pub fn envelope(self, body: Value) -> Value {
        let mut out = Map::new();
        match self {
            Reply::Raw => return body,
            Reply::Data => {
                out.insert("data".into(), body);
            }
            Reply::Message(msg) => {
                out.insert("message".into(), Value::String(msg.into()));
            }
            Reply::MessageData(msg) => {
                out.insert("message".into(), Value::String(msg.into()));
                out.insert("data".into(), body);
            }
            Reply::MessageKeyed(msg, key) => {
                out.insert("message".into(), Value::String(msg.into()));
                out.insert(key.into(), body);
            }
            Reply::Keyed(key) => {
                out.insert(key.into(), body);
            }
        }
        Value::Object(out)
    }

    pub fn respond(self, body: Value) -> Response {
        Json(self.envelope(body)).into_response()
    }
}

pub type ApiResult = Result<Response, ApiError>;
