// Campaign content and feedback. Successful replies pass the upstream body
// through untouched.

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{credential, present, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::error::ApiError;
use crate::mailchimp::{ApiPath, Call};

#[derive(Debug, Default, Deserialize)]
pub struct ContentBody {
    pub html: Option<String>,
    pub plain_text: Option<String>,
    pub url: Option<String>,
    pub archive_html: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackBody {
    pub message: Option<String>,
    pub email: Option<String>,
}

/// PUT /api/mailchimp/set-campaign-content/:apiKey/:campaignId
pub async fn set_campaign_content(
    State(state): State<AppState>,
    Path((api_key, campaign_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<ContentBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;

    let content: Map<String, Value> = [
        ("html", &body.html),
        ("plain_text", &body.plain_text),
        ("url", &body.url),
        ("archive_html", &body.archive_html),
    ]
    .into_iter()
    .filter_map(|(key, field)| present(field).map(|v| (key.to_string(), Value::String(v.to_string()))))
    .collect();

    if content.is_empty() {
        return Err(ApiError::bad_request(
            "At least one content field is required: html, plain_text, url, archive_html",
        ));
    }

    let path = ApiPath::new(["campaigns", campaign_id.as_str(), "content"]);
    let result = state
        .client()
        .send(&credential, Call::put(path, Value::Object(content)))
        .await?;
    Ok(Reply::Raw.respond(result))
}

/// POST /api/mailchimp/add-campaign-feedback/:apiKey/:campaignId
pub async fn add_campaign_feedback(
    State(state): State<AppState>,
    Path((api_key, campaign_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<FeedbackBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let (Some(message), Some(email)) = (present(&body.message), present(&body.email)) else {
        return Err(ApiError::bad_request("Missing required fields: message, email"));
    };

    let path = ApiPath::new(["campaigns", campaign_id.as_str(), "feedback"]);
    let payload = json!({ "message": message, "email": email });
    let result = state.client().send(&credential, Call::post(path, payload)).await?;
    Ok(Reply::Raw.respond(result))
}

/// PATCH /api/mailchimp/update-campaign-feedback/:apiKey/:campaignId/:feedbackId
pub async fn update_campaign_feedback(
    State(state): State<AppState>,
    Path((api_key, campaign_id, feedback_id)): Path<(String, String, String)>,
    JsonBody(body): JsonBody<FeedbackBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let Some(message) = present(&body.message) else {
        return Err(ApiError::bad_request("Missing required field: message"));
    };

    let path = ApiPath::new(["campaigns", campaign_id.as_str(), "feedback", feedback_id.as_str()]);
    let result = state
        .client()
        .send(&credential, Call::patch(path, json!({ "message": message })))
        .await?;
    Ok(Reply::Raw.respond(result))
}
