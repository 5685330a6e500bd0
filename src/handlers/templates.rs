use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{credential, AppState};
use crate::api::envelope::{ApiResult, Reply};
use crate::mailchimp::paginate::{collect_all, PagedQuery};
use crate::mailchimp::ApiPath;

/// GET /api/mailchimp/list-templates/:apiKey - every template across all pages
pub async fn list_templates(State(state): State<AppState>, Path(api_key): Path<String>) -> ApiResult {
    let credential = credential(&api_key)?;
    let client = state.client();

    let query = PagedQuery::new(
        ApiPath::new(["templates"]),
        "templates",
        client.settings().template_page_size,
    );
    let collected = collect_all(client, &credential, &query).await?;

    Ok(Reply::Raw.respond(json!({ "templates": Value::Array(collected.records) })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailchimp::Credential;
    use crate::testing::{fake_state, page, FakeTransport};
    use reqwest::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_templates_walks_pages_of_300() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(StatusCode::OK, page("templates", 0, 300));
        transport.push_json(StatusCode::OK, page("templates", 300, 12));

        let response = list_templates(State(fake_state(transport.clone())), Path(Credential::encode("abc-us2")))
            .await
            .unwrap();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let reply: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reply["templates"].as_array().unwrap().len(), 312);

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].url.query(), Some("offset=300&count=300"));
    }
}
