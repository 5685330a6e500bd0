use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;

use super::{credential, require, strip_nulls, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::mailchimp::{ApiPath, Call};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListBody {
    pub list_name: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_city: Option<String>,
    pub company_state: Option<String>,
    pub company_zip: Option<String>,
    pub company_country: Option<String>,
    pub campaign_from_name: Option<String>,
    pub campaign_from_email: Option<String>,
    pub campaign_subject: Option<String>,
}

/// POST /api/mailchimp/create-list/:apiKey
pub async fn create_list(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    JsonBody(body): JsonBody<CreateListBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let name = require(&body.list_name, "Missing list name")?;

    let payload = strip_nulls(json!({
        "name": name,
        "permission_reminder": "permission_reminder",
        "email_type_option": true,
        "contact": {
            "company": body.company_name,
            "address1": body.company_address,
            "city": body.company_city,
            "state": body.company_state,
            "zip": body.company_zip,
            "country": body.company_country,
        },
        "campaign_defaults": {
            "from_name": body.campaign_from_name,
            "from_email": body.campaign_from_email,
            "subject": body.campaign_subject,
            "language": "en",
        },
    }));

    let created = state
        .client()
        .send(&credential, Call::post(ApiPath::new(["lists"]), payload))
        .await?;
    Ok(Reply::Data.respond(created))
}
