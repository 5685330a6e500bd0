use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{credential, strip_nulls, truthy, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::error::ApiError;
use crate::mailchimp::{ApiPath, Call, UpstreamError};

#[derive(Debug, Default, Deserialize)]
pub struct CampaignBody {
    #[serde(rename = "type")]
    pub campaign_type: Option<String>,
    pub list_id: Option<String>,
    pub saved_segment_id: Option<Value>,
    pub subject_line: Option<String>,
    pub title: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub template_id: Option<Value>,
}

impl CampaignBody {
    /// `{recipients, settings}`; unset fields are omitted. A saved segment is
    /// only targeted when its id is above 1.
    fn settings_payload(&self) -> Value {
        let mut recipients = json!({ "list_id": self.list_id });
        if let Some(segment_id) = self.saved_segment_id.as_ref().filter(|id| segment_id_above_one(id)) {
            recipients["segment_opts"] = json!({ "saved_segment_id": segment_id });
        }

        strip_nulls(json!({
            "recipients": recipients,
            "settings": {
                "subject_line": self.subject_line,
                "title": self.title,
                "from_name": self.from_name,
                "reply_to": self.reply_to,
                "template_id": self.template_id,
            },
        }))
    }
}

fn segment_id_above_one(id: &Value) -> bool {
    let numeric = match id {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    numeric.map_or(false, |n| n > 1.0)
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleBody {
    pub schedule_time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailBody {
    pub test_emails: Option<Value>,
    pub send_type: Option<Value>,
}

fn action_path(campaign_id: &str, action: &str) -> ApiPath {
    ApiPath::new(["campaigns", campaign_id, "actions", action])
}

/// POST /api/mailchimp/create-campaign/:apiKey
pub async fn create_campaign(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    JsonBody(body): JsonBody<CampaignBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;

    let mut payload = body.settings_payload();
    if let Some(kind) = &body.campaign_type {
        payload["type"] = Value::String(kind.clone());
    }

    let created = state
        .client()
        .send(&credential, Call::post(ApiPath::new(["campaigns"]), payload))
        .await?;
    Ok(Reply::MessageData("Campaign Created Successfully").respond(created))
}

/// PATCH /api/mailchimp/update-campaign/:apiKey/:campaignId
pub async fn update_campaign(
    State(state): State<AppState>,
    Path((api_key, campaign_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<CampaignBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;

    let path = ApiPath::new(["campaigns", campaign_id.as_str()]);
    let updated = state
        .client()
        .send(&credential, Call::patch(path, body.settings_payload()))
        .await?;
    Ok(Reply::MessageData("Campaign Updated Successfully").respond(updated))
}

/// POST /api/mailchimp/schedule-campaign/:apiKey/:campaignId
pub async fn schedule_campaign(
    State(state): State<AppState>,
    Path((api_key, campaign_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<ScheduleBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    if !truthy(&body.schedule_time) {
        return Err(ApiError::bad_request("Missing schedule time"));
    }

    let payload = json!({ "schedule_time": body.schedule_time });
    let result = state
        .client()
        .send(&credential, Call::post(action_path(&campaign_id, "schedule"), payload))
        .await?;
    Ok(Reply::Message("Campaign scheduled successfully").respond(result))
}

/// POST /api/mailchimp/resend-to-non-openers/:apiKey/:campaignId
///
/// Creates the resend campaign, then sends it. A failure in the first step
/// means the second is never attempted.
pub async fn resend_to_non_openers(
    State(state): State<AppState>,
    Path((api_key, campaign_id)): Path<(String, String)>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let client = state.client();

    let created = client
        .send(&credential, Call::post(action_path(&campaign_id, "create-resend"), json!({})))
        .await?;
    let new_id = match created.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(UpstreamError::UnexpectedBody("create-resend answered without a campaign id".into()).into())
        }
    };
    tracing::info!("Created resend campaign {} from {}", new_id, campaign_id);

    let sent = client
        .send(&credential, Call::post(action_path(&new_id, "send"), json!({})))
        .await?;
    Ok(Reply::Message("Resend to non-openers campaign created and sent successfully").respond(sent))
}

/// POST /api/mailchimp/send-test-email/:apiKey/:campaignId
pub async fn send_test_email(
    State(state): State<AppState>,
    Path((api_key, campaign_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<TestEmailBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    if !truthy(&body.test_emails) || !truthy(&body.send_type) {
        return Err(ApiError::bad_request("Missing required fields: test_emails, send_type"));
    }

    let payload = json!({
        "test_emails": body.test_emails,
        "send_type": body.send_type,
    });
    let result = state
        .client()
        .send(&credential, Call::post(action_path(&campaign_id, "test"), payload))
        .await?;
    Ok(Reply::Message("Test email sent successfully").respond(result))
}
