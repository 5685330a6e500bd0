use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{array_items, credential, present, truthy, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::error::ApiError;
use crate::mailchimp::merge::{append_to_static_segment, new_segment_payload};
use crate::mailchimp::{ApiPath, Call};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentBody {
    pub segment_name: Option<String>,
    pub conditions: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchMembersBody {
    pub members_to_add: Option<Value>,
    pub members_to_remove: Option<Value>,
}

/// Create a static segment (tags are created the same way).
pub(super) async fn create_static_segment(
    state: &AppState,
    api_key: &str,
    list_id: &str,
    name: &Option<String>,
    conditions: &Option<Value>,
) -> Result<Value, ApiError> {
    let credential = credential(api_key)?;
    let name = match present(name) {
        Some(name) if truthy(conditions) => name,
        _ => return Err(ApiError::bad_request("Missing required parameters")),
    };

    let payload = new_segment_payload(name, array_items(conditions));
    let call = Call::post(ApiPath::new(["lists", list_id, "segments"]), payload);
    Ok(state.client().send(&credential, call).await?)
}

/// Rename and/or append to a static segment via fetch-merge-patch.
pub(super) async fn update_static_segment(
    state: &AppState,
    api_key: &str,
    list_id: &str,
    segment_id: &str,
    name: &Option<String>,
    conditions: &Option<Value>,
) -> Result<Value, ApiError> {
    let credential = credential(api_key)?;
    let path = ApiPath::new(["lists", list_id, "segments", segment_id]);

    Ok(append_to_static_segment(
        state.client(),
        &credential,
        &path,
        present(name),
        array_items(conditions),
    )
    .await?)
}

/// POST /api/mailchimp/create-segment/:apiKey/:listId
pub async fn create_segment(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<SegmentBody>,
) -> ApiResult {
    let created = create_static_segment(&state, &api_key, &list_id, &body.segment_name, &body.conditions).await?;
    Ok(Reply::MessageKeyed("Segment Created Successfully", "segment").respond(created))
}

/// PATCH /api/mailchimp/update-segment/:apiKey/:listId/:segmentId
pub async fn update_segment(
    State(state): State<AppState>,
    Path((api_key, list_id, segment_id)): Path<(String, String, String)>,
    JsonBody(body): JsonBody<SegmentBody>,
) -> ApiResult {
    let updated = update_static_segment(
        &state,
        &api_key,
        &list_id,
        &segment_id,
        &body.segment_name,
        &body.conditions,
    )
    .await?;
    Ok(Reply::MessageData("Segment Updated Successfully").respond(updated))
}

/// POST /api/mailchimp/batch-add-remove-member-segment/:apiKey/:listId/:segmentId
pub async fn batch_add_remove(
    State(state): State<AppState>,
    Path((api_key, list_id, segment_id)): Path<(String, String, String)>,
    JsonBody(body): JsonBody<BatchMembersBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;

    let mut payload = Map::new();
    for (field, value) in [
        ("members_to_add", &body.members_to_add),
        ("members_to_remove", &body.members_to_remove),
    ] {
        let items = array_items(value);
        if !items.is_empty() {
            payload.insert(field.into(), Value::Array(items.to_vec()));
        }
    }
    if payload.is_empty() {
        return Err(ApiError::bad_request("No members to add or remove"));
    }

    let path = ApiPath::new(["lists", list_id.as_str(), "segments", segment_id.as_str()]);
    let result = state
        .client()
        .send(&credential, Call::post(path, Value::Object(payload)))
        .await
        .map_err(ApiError::with_upstream_errors)?;
    Ok(Reply::Data.respond(result))
}
