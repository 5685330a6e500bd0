use serde_json::{json, Map, Value};

use super::client::{ApiPath, Call, MailchimpClient};
use super::credential::Credential;
use super::error::UpstreamError;

/// Build the PATCH payload for an append-only segment update.
///
/// `additions` are concatenated after the existing `static_segment` entries
/// with no de-duplication. When the caller gives no (or an empty) name the
/// current one is sent back. A segment without a `static_segment` field and no
/// additions gets no `static_segment` in the payload, so a rename never clears
/// members.
pub fn merged_static_segment(current: &Value, name: Option<&str>, additions: &[Value]) -> Value {
    let mut payload = Map::new();

    let name = name
        .filter(|n| !n.is_empty())
        .map(|n| Value::String(n.to_string()))
        .unwrap_or_else(|| current.get("name").cloned().unwrap_or(Value::Null));
    payload.insert("name".into(), name);

    let existing = current.get("static_segment").and_then(Value::as_array);
    if existing.is_some() || !additions.is_empty() {
        let mut merged = existing.cloned().unwrap_or_default();
        merged.extend(additions.iter().cloned());
        payload.insert("static_segment".into(), Value::Array(merged));
    }

    Value::Object(payload)
}

/// Fetch a segment, append to its static member list and PATCH it back.
///
/// Two independent calls with no version check: an update landing between
/// them is overwritten (last writer wins).
pub async fn append_to_static_segment(
    client: &MailchimpClient,
    credential: &Credential,
    path: &ApiPath,
    name: Option<&str>,
    additions: &[Value],
) -> Result<Value, UpstreamError> {
    let current = client.send(credential, Call::get(path.clone())).await?;
    let payload = merged_static_segment(&current, name, additions);
    client.send(credential, Call::patch(path.clone(), payload)).await
}

/// `{name, static_segment: [], options?}` for a new segment or tag.
pub fn new_segment_payload(name: &str, conditions: &[Value]) -> Value {
    let mut payload = json!({
        "name": name,
        "static_segment": [],
    });
    if !conditions.is_empty() {
        payload["options"] = json!({
            "match": "any",
            "conditions": conditions,
        });
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::testing::FakeTransport;
    use reqwest::{Method, StatusCode};
    use std::sync::Arc;

    #[test]
    fn test_appends_in_order() {
        let current = json!({"name": "VIP", "static_segment": ["A", "B"]});
        let payload = merged_static_segment(&current, None, &[json!("C")]);
        assert_eq!(payload, json!({"name": "VIP", "static_segment": ["A", "B", "C"]}));
    }

    #[test]
    fn test_resubmission_duplicates() {
        let current = json!({"name": "VIP", "static_segment": ["A", "B", "C"]});
        let payload = merged_static_segment(&current, None, &[json!("C")]);
        assert_eq!(payload["static_segment"], json!(["A", "B", "C", "C"]));
    }

    #[test]
    fn test_caller_name_wins_unless_empty() {
        let current = json!({"name": "Old", "static_segment": []});
        assert_eq!(merged_static_segment(&current, Some("New"), &[])["name"], "New");
        assert_eq!(merged_static_segment(&current, Some(""), &[])["name"], "Old");
    }

    #[test]
    fn test_rename_without_member_list_leaves_members_alone() {
        let current = json!({"name": "Old", "type": "static", "member_count": 12});
        let payload = merged_static_segment(&current, Some("New"), &[]);
        assert_eq!(payload, json!({"name": "New"}));

        let payload = merged_static_segment(&current, None, &[json!("a@b.c")]);
        assert_eq!(payload["static_segment"], json!(["a@b.c"]));
    }

    #[test]
    fn test_new_segment_payload_options_only_with_conditions() {
        assert_eq!(new_segment_payload("T", &[]), json!({"name": "T", "static_segment": []}));
        let with = new_segment_payload("T", &[json!({"field": "EMAIL"})]);
        assert_eq!(with["options"]["match"], "any");
        assert_eq!(with["options"]["conditions"][0]["field"], "EMAIL");
    }

    #[tokio::test]
    async fn test_fetch_then_patch_with_merged_payload() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(StatusCode::OK, json!({"id": 7, "name": "VIP", "static_segment": ["A", "B"]}));
        transport.push_json(StatusCode::OK, json!({"id": 7, "name": "VIP"}));
        let client = MailchimpClient::with_transport(AppConfig::development().mailchimp, transport.clone());
        let credential = Credential::from_secret("k-us2").unwrap();

        let path = ApiPath::new(["lists", "l1", "segments", "7"]);
        let result = append_to_static_segment(&client, &credential, &path, None, &[json!("C")])
            .await
            .unwrap();

        assert_eq!(result["id"], 7);
        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[1].method, Method::PATCH);
        assert_eq!(sent[1].body.as_ref().unwrap()["static_segment"], json!(["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_failed_fetch_skips_patch() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(StatusCode::NOT_FOUND, json!({"detail": "The requested segment was not found"}));
        let client = MailchimpClient::with_transport(AppConfig::development().mailchimp, transport.clone());
        let credential = Credential::from_secret("k-us2").unwrap();

        let path = ApiPath::new(["lists", "l1", "segments", "404"]);
        let err = append_to_static_segment(&client, &credential, &path, None, &[json!("C")])
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Rejected { .. }));
        assert_eq!(transport.call_count(), 1);
    }
}
