use serde_json::Value;

use super::client::{ApiPath, Call, MailchimpClient};
use super::credential::Credential;
use super::error::UpstreamError;

/// What a paginated walk produced.
#[derive(Debug, Clone)]
pub struct Collected {
    /// The final (short) page with its record field removed.
    pub last_page: Value,
    /// Records from every page, in arrival order.
    pub records: Vec<Value>,
    /// Number of upstream calls issued.
    pub pages: usize,
}

/// A collection endpoint to walk with `offset`/`count`.
#[derive(Debug, Clone)]
pub struct PagedQuery<'a> {
    pub path: ApiPath,
    /// Name of the array field holding the records (`members`, `templates`).
    pub records_field: &'a str,
    pub page_size: usize,
    /// Fixed query parameters sent with every page.
    pub extra_query: Vec<(&'a str, String)>,
}

impl<'a> PagedQuery<'a> {
    pub fn new(path: ApiPath, records_field: &'a str, page_size: usize) -> Self {
        Self {
            path,
            records_field,
            page_size,
            extra_query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &'a str, value: impl ToString) -> Self {
        self.extra_query.push((key, value.to_string()));
        self
    }
}

/// Fetch pages until one comes back shorter than `page_size`.
///
/// The walk is strictly sequential. A final page that happens to be exactly
/// full costs one extra (empty) call. The client's `max_pages` bounds the
/// number of calls; hitting it is an error rather than a truncated result.
pub async fn collect_all(
    client: &MailchimpClient,
    credential: &Credential,
    query: &PagedQuery<'_>,
) -> Result<Collected, UpstreamError> {
    let page_size = query.page_size.max(1);
    let max_pages = client.settings().max_pages;

    let mut records = Vec::new();
    let mut offset = 0usize;
    let mut pages = 0usize;

    loop {
        if pages >= max_pages {
            tracing::error!("Pagination of {} hit the {} page cap", query.path, max_pages);
            return Err(UpstreamError::PageLimit(pages));
        }

        let mut call = Call::get(query.path.clone());
        for (key, value) in &query.extra_query {
            call = call.query(*key, value);
        }
        let call = call.query("offset", offset).query("count", page_size);

        let mut page = client.send(credential, call).await?;
        pages += 1;

        let batch = take_records(&mut page, query.records_field)?;
        let received = batch.len();
        records.extend(batch);

        if received < page_size {
            tracing::debug!("Collected {} records from {} in {} pages", records.len(), query.path, pages);
            return Ok(Collected {
                last_page: page,
                records,
                pages,
            });
        }

        offset += page_size;
    }
}

fn take_records(page: &mut Value, field: &str) -> Result<Vec<Value>, UpstreamError> {
    match page.as_object_mut().and_then(|map| map.remove(field)) {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(UpstreamError::UnexpectedBody(format!("page without a '{}' array", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::testing::{page, FakeTransport};
    use reqwest::StatusCode;
    use std::sync::Arc;

    fn setup(max_pages: usize) -> (Arc<FakeTransport>, MailchimpClient) {
        let transport = Arc::new(FakeTransport::new());
        let mut settings = AppConfig::development().mailchimp;
        settings.max_pages = max_pages;
        let client = MailchimpClient::with_transport(settings, transport.clone());
        (transport, client)
    }

    fn credential() -> Credential {
        Credential::from_secret("abc-us1").unwrap()
    }

    #[tokio::test]
    async fn test_stops_on_short_page_and_keeps_order() {
        let (transport, client) = setup(1000);
        transport.push_json(StatusCode::OK, page("members", 0, 100));
        transport.push_json(StatusCode::OK, page("members", 100, 100));
        transport.push_json(StatusCode::OK, page("members", 200, 100));
        transport.push_json(StatusCode::OK, page("members", 300, 42));

        let query = PagedQuery::new(ApiPath::new(["lists", "l1", "members"]), "members", 100);
        let collected = collect_all(&client, &credential(), &query).await.unwrap();

        assert_eq!(transport.call_count(), 4);
        assert_eq!(collected.pages, 4);
        assert_eq!(collected.records.len(), 342);
        let ids: Vec<String> = collected
            .records
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<String> = (0..342).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);

        let offsets: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "offset")
                    .map(|(_, v)| v.into_owned())
                    .unwrap()
            })
            .collect();
        assert_eq!(offsets, vec!["0", "100", "200", "300"]);
    }

    #[tokio::test]
    async fn test_full_last_page_costs_exactly_one_extra_call() {
        let (transport, client) = setup(1000);
        transport.push_json(StatusCode::OK, page("templates", 0, 100));
        transport.push_json(StatusCode::OK, page("templates", 100, 0));

        let query = PagedQuery::new(ApiPath::new(["templates"]), "templates", 100);
        let collected = collect_all(&client, &credential(), &query).await.unwrap();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(collected.records.len(), 100);
    }

    #[tokio::test]
    async fn test_last_page_metadata_is_kept_without_records() {
        let (transport, client) = setup(1000);
        transport.push_json(
            StatusCode::OK,
            serde_json::json!({"members": [{"id": "a"}], "list_id": "l1", "total_items": 1}),
        );

        let query = PagedQuery::new(ApiPath::new(["lists", "l1", "members"]), "members", 100);
        let collected = collect_all(&client, &credential(), &query).await.unwrap();

        assert_eq!(collected.last_page["list_id"], "l1");
        assert_eq!(collected.last_page["members"], Value::Null);
    }

    #[tokio::test]
    async fn test_page_cap_aborts_runaway_upstream() {
        let (transport, client) = setup(3);
        for i in 0..5 {
            transport.push_json(StatusCode::OK, page("members", i * 10, 10));
        }

        let query = PagedQuery::new(ApiPath::new(["lists", "l1", "members"]), "members", 10);
        let err = collect_all(&client, &credential(), &query).await.unwrap_err();

        assert!(matches!(err, UpstreamError::PageLimit(3)));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rejection_mid_walk_aborts() {
        let (transport, client) = setup(1000);
        transport.push_json(StatusCode::OK, page("members", 0, 10));
        transport.push_json(StatusCode::TOO_MANY_REQUESTS, serde_json::json!({"detail": "Slow down"}));

        let query = PagedQuery::new(ApiPath::new(["lists", "l1", "members"]), "members", 10);
        let err = collect_all(&client, &credential(), &query).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Rejected { .. }));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_record_field_is_unexpected_body() {
        let (transport, client) = setup(1000);
        transport.push_json(StatusCode::OK, serde_json::json!({"total_items": 0}));

        let query = PagedQuery::new(ApiPath::new(["templates"]), "templates", 300);
        let err = collect_all(&client, &credential(), &query).await.unwrap_err();

        assert!(matches!(err, UpstreamError::UnexpectedBody(_)));
    }
}
