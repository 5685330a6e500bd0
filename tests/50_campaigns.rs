mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use httpmock::prelude::*;
use serde_json::json;

#[tokio::test]
async fn create_campaign_targets_saved_segment_above_one() -> Result<()> {
    let app = common::TestApp::start().await?;
    let create = app
        .upstream
        .mock_async(|when, then| {
            when.method(POST).path("/3.0/campaigns").json_body(json!({
                "type": "regular",
                "recipients": {"list_id": "L1", "segment_opts": {"saved_segment_id": 42}},
                "settings": {
                    "subject_line": "Spring sale",
                    "title": "Spring",
                    "from_name": "Acme",
                    "reply_to": "hello@acme.test",
                    "template_id": 9,
                },
            }));
            then.status(200).json_body(json!({"id": "c1", "status": "save"}));
        })
        .await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/mailchimp/create-campaign/{}", common::encoded_key()),
            Some(json!({
                "type": "regular",
                "list_id": "L1",
                "saved_segment_id": 42,
                "subject_line": "Spring sale",
                "title": "Spring",
                "from_name": "Acme",
                "reply_to": "hello@acme.test",
                "template_id": 9,
            })),
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Campaign Created Successfully");
    assert_eq!(body["data"]["id"], "c1");
    create.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn resend_to_non_openers_creates_then_sends() -> Result<()> {
    let app = common::TestApp::start().await?;
    let create = app
        .upstream
        .mock_async(|when, then| {
            when.method(POST).path("/3.0/campaigns/c1/actions/create-resend");
            then.status(200).json_body(json!({"id": "c2", "type": "regular"}));
        })
        .await;
    let send = app
        .upstream
        .mock_async(|when, then| {
            when.method(POST).path("/3.0/campaigns/c2/actions/send");
            then.status(204);
        })
        .await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/mailchimp/resend-to-non-openers/{}/c1", common::encoded_key()),
            None,
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Resend to non-openers campaign created and sent successfully"}));
    create.assert_hits_async(1).await;
    send.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn resend_stops_when_create_fails() -> Result<()> {
    let app = common::TestApp::start().await?;
    app.upstream
        .mock_async(|when, then| {
            when.method(POST).path("/3.0/campaigns/c1/actions/create-resend");
            then.status(400).json_body(json!({"detail": "This campaign cannot be resent."}));
        })
        .await;
    let send = app
        .upstream
        .mock_async(|when, then| {
            when.method(POST).path_contains("/actions/send");
            then.status(204);
        })
        .await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/mailchimp/resend-to-non-openers/{}/c1", common::encoded_key()),
            None,
        )
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "This campaign cannot be resent."}));
    send.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn action_routes_post_empty_object_and_reply_with_message() -> Result<()> {
    let app = common::TestApp::start().await?;
    let send = app
        .upstream
        .mock_async(|when, then| {
            when.method(POST).path("/3.0/campaigns/c1/actions/send").json_body(json!({}));
            then.status(204);
        })
        .await;
    let replicate = app
        .upstream
        .mock_async(|when, then| {
            when.method(POST).path("/3.0/campaigns/c1/actions/replicate");
            then.status(200).json_body(json!({"id": "c1-copy"}));
        })
        .await;

    let (status, body) = app
        .call(Method::POST, &format!("/api/mailchimp/send-campaign/{}/c1", common::encoded_key()), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Campaign sent successfully"}));

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/mailchimp/replicate-campaign/{}/c1", common::encoded_key()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Campaign replicated successfully", "campaign": {"id": "c1-copy"}}));

    send.assert_hits_async(1).await;
    replicate.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn schedule_and_test_email_validate_before_calling() -> Result<()> {
    let app = common::TestApp::start().await?;
    let anything = app
        .upstream
        .mock_async(|when, then| {
            when.path_contains("/campaigns/");
            then.status(204);
        })
        .await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/mailchimp/schedule-campaign/{}/c1", common::encoded_key()),
            Some(json!({})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing schedule time"}));

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/mailchimp/send-test-email/{}/c1", common::encoded_key()),
            Some(json!({"test_emails": ["qa@acme.test"]})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing required fields: test_emails, send_type"}));

    anything.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn content_routes_pass_the_upstream_body_through() -> Result<()> {
    let app = common::TestApp::start().await?;
    let put = app
        .upstream
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/3.0/campaigns/c1/content")
                .json_body(json!({"plain_text": "Hello"}));
            then.status(200).json_body(json!({"plain_text": "Hello", "html": ""}));
        })
        .await;
    let feedback = app
        .upstream
        .mock_async(|when, then| {
            when.method(GET).path("/3.0/campaigns/c1/feedback/f1");
            then.status(200).json_body(json!({"feedback_id": 1, "message": "Nice"}));
        })
        .await;

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/mailchimp/set-campaign-content/{}/c1", common::encoded_key()),
            Some(json!({"plain_text": "Hello"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"plain_text": "Hello", "html": ""}));

    let (status, body) = app
        .get(&format!("/api/mailchimp/get-campaign-feedback/{}/c1/f1", common::encoded_key()))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"feedback_id": 1, "message": "Nice"}));

    put.assert_hits_async(1).await;
    feedback.assert_hits_async(1).await;
    Ok(())
}
