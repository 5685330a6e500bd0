use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::{IntoResponse, Json},
    routing::{get, patch, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{
    campaigns, content, lists, members, proxy, segments, signup_forms, tags, templates, webhooks, AppState,
};

/// Build the complete router from an explicit configuration.
pub fn app(config: &AppConfig, state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Pure pass-through routes
        .merge(proxy::routes())
        // Routes that validate or reshape their input
        .merge(list_routes())
        .merge(member_routes())
        .merge(segment_routes())
        .merge(tag_routes())
        .merge(signup_form_routes())
        .merge(campaign_routes())
        .merge(template_routes())
        .merge(webhook_routes(config))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn list_routes() -> Router<AppState> {
    Router::new().route("/api/mailchimp/create-list/:apiKey", post(lists::create_list))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mailchimp/member-list/:apiKey/:listId", get(members::member_list))
        .route("/api/mailchimp/add-member/:apiKey/:listId", post(members::add_member))
        .route("/api/mailchimp/edit-member/:apiKey/:listId", put(members::edit_member))
}

fn segment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mailchimp/create-segment/:apiKey/:listId", post(segments::create_segment))
        .route(
            "/api/mailchimp/update-segment/:apiKey/:listId/:segmentId",
            patch(segments::update_segment),
        )
        .route(
            "/api/mailchimp/batch-add-remove-member-segment/:apiKey/:listId/:segmentId",
            post(segments::batch_add_remove),
        )
}

fn signup_form_routes() -> Router<AppState> {
    Router::new().route(
        "/api/mailchimp/customize-signup-form/:apiKey/:listId",
        post(signup_forms::customize_signup_form),
    )
}

fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mailchimp/tag-list/:apiKey/:listId/:tagCount", get(tags::tag_list))
        .route("/api/mailchimp/add-member-tag/:apiKey/:listId", post(tags::add_member_tag))
        .route("/api/mailchimp/update-member-tags/:apiKey/:listId", post(tags::update_member_tags))
        .route("/api/mailchimp/create-tag/:apiKey/:listId", post(tags::create_tag))
        .route("/api/mailchimp/update-tag/:apiKey/:listId/:tagId", patch(tags::update_tag))
        .route("/api/mailchimp/members-by-tag/:apiKey/:listId/:tagId", get(tags::members_by_tag))
}

fn campaign_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mailchimp/create-campaign/:apiKey", post(campaigns::create_campaign))
        .route("/api/mailchimp/update-campaign/:apiKey/:campaignId", patch(campaigns::update_campaign))
        .route(
            "/api/mailchimp/schedule-campaign/:apiKey/:campaignId",
            post(campaigns::schedule_campaign),
        )
        .route(
            "/api/mailchimp/resend-to-non-openers/:apiKey/:campaignId",
            post(campaigns::resend_to_non_openers),
        )
        .route("/api/mailchimp/send-test-email/:apiKey/:campaignId", post(campaigns::send_test_email))
        .route(
            "/api/mailchimp/set-campaign-content/:apiKey/:campaignId",
            put(content::set_campaign_content),
        )
        .route(
            "/api/mailchimp/add-campaign-feedback/:apiKey/:campaignId",
            post(content::add_campaign_feedback),
        )
        .route(
            "/api/mailchimp/update-campaign-feedback/:apiKey/:campaignId/:feedbackId",
            patch(content::update_campaign_feedback),
        )
}

fn template_routes() -> Router<AppState> {
    Router::new().route("/api/mailchimp/list-templates/:apiKey", get(templates::list_templates))
}

fn webhook_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/app-webhooks", get(webhooks::verify).post(webhooks::receive))
        .layer(DefaultBodyLimit::max(config.api.max_webhook_size_bytes))
}

/// No origins configured means any origin may call.
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Mailchimp Proxy",
        "version": version,
        "description": "Backend proxy for the Mailchimp Marketing API",
        "endpoints": {
            "home": "/",
            "health": "/health",
            "mailchimp": "/api/mailchimp/:action/:apiKey[/...] (base64-encoded API key)",
            "webhooks": "/app-webhooks",
        }
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
