use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{credential, present, require, strip_nulls, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::mailchimp::paginate::{collect_all, PagedQuery};
use crate::mailchimp::{subscriber_hash, ApiPath, Call};

const PUT_HINT: &str = " Use PUT to insert or update list members.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Value>,
}

/// GET /api/mailchimp/member-list/:apiKey/:listId
///
/// Walks every page; the reply is the last page's envelope with `members`
/// holding the records of all pages.
pub async fn member_list(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let client = state.client();

    let query = PagedQuery::new(
        ApiPath::new(["lists", list_id.as_str(), "members"]),
        "members",
        client.settings().member_page_size,
    );
    let collected = collect_all(client, &credential, &query).await?;
    tracing::debug!("Collected {} members over {} pages", collected.records.len(), collected.pages);

    let mut data = collected.last_page;
    if let Value::Object(map) = &mut data {
        map.insert("members".into(), Value::Array(collected.records));
    }
    Ok(Reply::Data.respond(data))
}

/// POST /api/mailchimp/add-member/:apiKey/:listId
pub async fn add_member(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<MemberBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let email = require(&body.email, "Missing Mailchimp API key, list ID, or email")?;

    let payload = strip_nulls(json!({
        "email_address": email,
        "status": body.status,
        "merge_fields": {
            "FNAME": body.first_name,
            "LNAME": body.last_name,
        },
        "tags": body.tags,
    }));

    let call = Call::post(ApiPath::new(["lists", list_id.as_str(), "members"]), payload);
    let created = state
        .client()
        .send(&credential, call)
        .await
        .map_err(|e| e.map_detail(|d| d.replace(PUT_HINT, "")))?;

    Ok(Reply::MessageData("Contact Added Successfully").respond(created))
}

/// PUT /api/mailchimp/edit-member/:apiKey/:listId
pub async fn edit_member(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<MemberBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let email = require(&body.email, "Missing Mailchimp API key, list ID, or email")?;

    let payload = strip_nulls(json!({
        "email_address": email,
        "status": present(&body.status).unwrap_or("subscribed"),
        "merge_fields": {
            "FNAME": body.first_name,
            "LNAME": body.last_name,
        },
    }));

    let path = ApiPath::new(["lists".to_string(), list_id, "members".to_string(), subscriber_hash(email)]);
    let updated = state.client().send(&credential, Call::put(path, payload)).await?;

    Ok(Reply::MessageData("Contact Updated Successfully").respond(updated))
}
