use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::segments::{create_static_segment, update_static_segment};
use super::{credential, require, truthy, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::error::ApiError;
use crate::mailchimp::paginate::{collect_all, PagedQuery};
use crate::mailchimp::{subscriber_hash, ApiPath, Call, UpstreamError};

/// Member fields kept when scanning a list for a tag.
const TAGGED_MEMBER_FIELDS: &str = "members.id,members.email_address,members.full_name,members.status,\
members.merge_fields,members.source,members.tags";

#[derive(Debug, Default, Deserialize)]
pub struct MemberTagBody {
    pub email: Option<String>,
    pub tag: Option<String>,
    pub tags: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagBody {
    pub tag_name: Option<String>,
    pub conditions: Option<Value>,
}

/// GET /api/mailchimp/tag-list/:apiKey/:listId/:tagCount
///
/// Tags are the list's static segments; the first `tagCount` are returned.
pub async fn tag_list(
    State(state): State<AppState>,
    Path((api_key, list_id, tag_count)): Path<(String, String, String)>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let limit: usize = tag_count
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid tag count"))?;

    let body = state
        .client()
        .send(&credential, Call::get(ApiPath::new(["lists", list_id.as_str(), "segments"])))
        .await?;
    let segments = body
        .get("segments")
        .and_then(Value::as_array)
        .ok_or_else(|| UpstreamError::UnexpectedBody("segment list without `segments`".into()))?;

    let tags: Vec<Value> = segments
        .iter()
        .filter(|s| s.get("type").and_then(Value::as_str) == Some("static"))
        .take(limit)
        .cloned()
        .collect();

    Ok(Reply::Data.respond(json!({ "tags": tags })))
}

/// POST /api/mailchimp/add-member-tag/:apiKey/:listId
pub async fn add_member_tag(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<MemberTagBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let missing = "Missing Mailchimp API key, list ID, email, or tag";
    let email = require(&body.email, missing)?;
    let tag = require(&body.tag, missing)?;

    let payload = json!({ "tags": [{ "name": tag, "status": "active" }] });
    let result = state
        .client()
        .send(&credential, Call::post(member_tags_path(&list_id, email), payload))
        .await?;
    Ok(Reply::Data.respond(result))
}

/// POST /api/mailchimp/update-member-tags/:apiKey/:listId
pub async fn update_member_tags(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<MemberTagBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let missing = "Missing Mailchimp API key, list ID, email, or tags";
    let email = require(&body.email, missing)?;
    if !truthy(&body.tags) {
        return Err(ApiError::bad_request(missing));
    }

    let payload = json!({ "tags": body.tags });
    let result = state
        .client()
        .send(&credential, Call::post(member_tags_path(&list_id, email), payload))
        .await?;
    Ok(Reply::MessageData("Member tag Updated Successfully").respond(result))
}

/// POST /api/mailchimp/create-tag/:apiKey/:listId
pub async fn create_tag(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<TagBody>,
) -> ApiResult {
    let created = create_static_segment(&state, &api_key, &list_id, &body.tag_name, &body.conditions).await?;
    Ok(Reply::MessageKeyed("Tag Created Successfully", "tag").respond(created))
}

/// PATCH /api/mailchimp/update-tag/:apiKey/:listId/:tagId
pub async fn update_tag(
    State(state): State<AppState>,
    Path((api_key, list_id, tag_id)): Path<(String, String, String)>,
    JsonBody(body): JsonBody<TagBody>,
) -> ApiResult {
    let updated =
        update_static_segment(&state, &api_key, &list_id, &tag_id, &body.tag_name, &body.conditions).await?;
    Ok(Reply::MessageData("Tag Updated Successfully").respond(updated))
}

/// GET /api/mailchimp/members-by-tag/:apiKey/:listId/:tagId
///
/// Confirms the tag exists, then scans the whole list and keeps members
/// carrying it.
pub async fn members_by_tag(
    State(state): State<AppState>,
    Path((api_key, list_id, tag_id)): Path<(String, String, String)>,
) -> ApiResult {
    let credential = credential(&api_key)?;
    let client = state.client();

    let search = Call::get(ApiPath::new(["lists", list_id.as_str(), "tag-search"])).query("id", &tag_id);
    let found = client.send(&credential, search).await?;
    let has_tags = found
        .get("tags")
        .and_then(Value::as_array)
        .map_or(false, |tags| !tags.is_empty());
    if !has_tags {
        return Err(ApiError::not_found("Tag not found"));
    }

    let query = PagedQuery::new(
        ApiPath::new(["lists", list_id.as_str(), "members"]),
        "members",
        client.settings().tagged_member_page_size,
    )
    .with_query("fields", TAGGED_MEMBER_FIELDS);
    let collected = collect_all(client, &credential, &query).await?;

    let members: Vec<Value> = collected
        .records
        .into_iter()
        .filter(|member| carries_tag(member, &tag_id))
        .collect();
    tracing::debug!("{} members carry tag {}", members.len(), tag_id);

    Ok(Reply::Data.respond(json!({ "members": members })))
}

fn member_tags_path(list_id: &str, email: &str) -> ApiPath {
    ApiPath::new([
        "lists".to_string(),
        list_id.to_string(),
        "members".to_string(),
        subscriber_hash(email),
        "tags".to_string(),
    ])
}

/// Tag ids arrive as numbers upstream and as strings in the path.
fn carries_tag(member: &Value, tag_id: &str) -> bool {
    let Some(tags) = member.get("tags").and_then(Value::as_array) else {
        return false;
    };
    tags.iter().any(|tag| match tag.get("id") {
        Some(Value::Number(n)) => n.to_string() == tag_id,
        Some(Value::String(s)) => s == tag_id,
        _ => false,
    })
}
