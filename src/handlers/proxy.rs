use axum::{
    extract::{Path, State},
    routing::{on, MethodFilter},
    Router,
};
use reqwest::Method;
use serde_json::json;
use std::collections::HashMap;

use super::{credential, AppState};
use crate::api::envelope::{ApiResult, Reply};
use crate::error::ApiError;
use crate::mailchimp::{subscriber_hash, ApiPath, Call};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
        }
    }

    /// Write verbs carry an (empty) JSON object upstream.
    fn has_body(self) -> bool {
        matches!(self, Verb::Post | Verb::Put | Verb::Patch)
    }
}

/// A route that is exactly one upstream call with no inbound body.
///
/// `upstream` is a path template below `/3.0`: `{name}` substitutes the path
/// parameter verbatim and `{name#}` substitutes its subscriber hash.
#[derive(Debug)]
pub struct ProxyRoute {
    pub verb: Verb,
    pub path: &'static str,
    pub upstream: &'static str,
    pub reply: Reply,
}

const fn route(verb: Verb, path: &'static str, upstream: &'static str, reply: Reply) -> ProxyRoute {
    ProxyRoute { verb, path, upstream, reply }
}

pub static PROXY_ROUTES: &[ProxyRoute] = &[
    // Lists
    route(Verb::Get, "/api/mailchimp/list/:apiKey", "lists", Reply::Data),
    route(Verb::Get, "/api/mailchimp/list-info/:apiKey/:listId", "lists/{listId}", Reply::Data),
    // Members
    route(
        Verb::Get,
        "/api/mailchimp/member-info/:apiKey/:listId/:email",
        "lists/{listId}/members/{email#}",
        Reply::Data,
    ),
    route(
        Verb::Delete,
        "/api/mailchimp/archive-member/:apiKey/:listId/:email",
        "lists/{listId}/members/{email#}",
        Reply::Message("Archived Successfully"),
    ),
    route(
        Verb::Get,
        "/api/mailchimp/member-tags/:apiKey/:listId/:email",
        "lists/{listId}/members/{email#}/tags",
        Reply::Data,
    ),
    // Segments
    route(
        Verb::Get,
        "/api/mailchimp/segment-list/:apiKey/:listId",
        "lists/{listId}/segments",
        Reply::Data,
    ),
    route(
        Verb::Get,
        "/api/mailchimp/segment-info/:apiKey/:listId/:segmentId",
        "lists/{listId}/segments/{segmentId}",
        Reply::Data,
    ),
    route(
        Verb::Delete,
        "/api/mailchimp/delete-segment/:apiKey/:listId/:segmentId",
        "lists/{listId}/segments/{segmentId}",
        Reply::Message("Segment deleted successfully"),
    ),
    // Tags
    route(
        Verb::Get,
        "/api/mailchimp/tag-info/:apiKey/:listId/:tagId",
        "lists/{listId}/segments/{tagId}",
        Reply::Data,
    ),
    route(
        Verb::Delete,
        "/api/mailchimp/delete-tag/:apiKey/:listId/:tagId",
        "lists/{listId}/segments/{tagId}",
        Reply::Message("Tag deleted successfully"),
    ),
    // Signup forms and surveys
    route(
        Verb::Get,
        "/api/mailchimp/signup-forms/:apiKey/:listId",
        "lists/{listId}/signup-forms",
        Reply::Data,
    ),
    route(
        Verb::Get,
        "/api/mailchimp/survey-list/:apiKey/:listId",
        "lists/{listId}/surveys",
        Reply::Data,
    ),
    route(
        Verb::Get,
        "/api/mailchimp/survey-info/:apiKey/:listId/:survey_id",
        "lists/{listId}/surveys/{survey_id}",
        Reply::Data,
    ),
    route(
        Verb::Post,
        "/api/mailchimp/publish-survey/:apiKey/:listId/:survey_id",
        "lists/{listId}/surveys/{survey_id}/actions/publish",
        Reply::MessageData("Survey Published Successfully"),
    ),
    route(
        Verb::Post,
        "/api/mailchimp/unpublish-survey/:apiKey/:listId/:survey_id",
        "lists/{listId}/surveys/{survey_id}/actions/unpublish",
        Reply::MessageData("Survey Unpublished Successfully"),
    ),
    // Campaigns
    route(Verb::Get, "/api/mailchimp/campaigns/:apiKey", "campaigns", Reply::Data),
    route(
        Verb::Get,
        "/api/mailchimp/campaign-info/:apiKey/:campaignId",
        "campaigns/{campaignId}",
        Reply::Data,
    ),
    route(
        Verb::Delete,
        "/api/mailchimp/delete-campaign/:apiKey/:campaignId",
        "campaigns/{campaignId}",
        Reply::Message("Campaign deleted successfully"),
    ),
    route(
        Verb::Post,
        "/api/mailchimp/send-campaign/:apiKey/:campaignId",
        "campaigns/{campaignId}/actions/send",
        Reply::Message("Campaign sent successfully"),
    ),
    route(
        Verb::Post,
        "/api/mailchimp/unschedule-campaign/:apiKey/:campaignId",
        "campaigns/{campaignId}/actions/unschedule",
        Reply::Message("Campaign unscheduled successfully"),
    ),
    route(
        Verb::Post,
        "/api/mailchimp/replicate-campaign/:apiKey/:campaignId",
        "campaigns/{campaignId}/actions/replicate",
        Reply::MessageKeyed("Campaign replicated successfully", "campaign"),
    ),
    route(
        Verb::Post,
        "/api/mailchimp/pause-rss-campaign/:apiKey/:campaignId",
        "campaigns/{campaignId}/actions/pause",
        Reply::Message("RSS-driven campaign paused successfully"),
    ),
    route(
        Verb::Post,
        "/api/mailchimp/resume-rss-campaign/:apiKey/:campaignId",
        "campaigns/{campaignId}/actions/resume",
        Reply::Message("RSS-driven campaign resumed successfully"),
    ),
    // Campaign content and feedback
    route(
        Verb::Get,
        "/api/mailchimp/campaign-content/:apiKey/:campaignId",
        "campaigns/{campaignId}/content",
        Reply::Raw,
    ),
    route(
        Verb::Get,
        "/api/mailchimp/get-campaign-comments/:apiKey/:campaignId",
        "campaigns/{campaignId}/feedback",
        Reply::Raw,
    ),
    route(
        Verb::Get,
        "/api/mailchimp/get-campaign-feedback/:apiKey/:campaignId/:feedbackId",
        "campaigns/{campaignId}/feedback/{feedbackId}",
        Reply::Raw,
    ),
    route(
        Verb::Delete,
        "/api/mailchimp/delete-campaign-feedback/:apiKey/:campaignId/:feedbackId",
        "campaigns/{campaignId}/feedback/{feedbackId}",
        Reply::Message("Feedback deleted successfully"),
    ),
    // Templates
    route(
        Verb::Get,
        "/api/mailchimp/template-info/:apiKey/:template_id",
        "templates/{template_id}",
        Reply::Keyed("template"),
    ),
];

/// Mount every table row onto one router.
pub fn routes() -> Router<AppState> {
    PROXY_ROUTES.iter().fold(Router::new(), |router, entry| {
        router.route(
            entry.path,
            on(
                entry.verb.filter(),
                move |State(state): State<AppState>, Path(params): Path<HashMap<String, String>>| {
                    forward(entry, state, params)
                },
            ),
        )
    })
}

/// Resolve the key, fill the template, make the call, wrap the answer.
pub async fn forward(route: &'static ProxyRoute, state: AppState, params: HashMap<String, String>) -> ApiResult {
    let encoded = params
        .get("apiKey")
        .ok_or_else(|| ApiError::bad_request("Missing Mailchimp API key"))?;
    let credential = credential(encoded)?;
    let path = render_upstream(route.upstream, &params)?;

    let mut call = Call::new(route.verb.method(), path);
    if route.verb.has_body() {
        call = call.body(json!({}));
    }

    let body = state.client().send(&credential, call).await?;
    Ok(route.reply.respond(body))
}

/// Expand an upstream template against the inbound path parameters.
pub fn render_upstream(template: &str, params: &HashMap<String, String>) -> Result<ApiPath, ApiError> {
    let mut segments = Vec::new();
    for part in template.split('/') {
        let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
            segments.push(part.to_string());
            continue;
        };

        let (name, hashed) = match name.strip_suffix('#') {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };
        let value = params
            .get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing required parameters"))?;

        segments.push(if hashed { subscriber_hash(value) } else { value.clone() });
    }
    Ok(ApiPath::new(segments))
}
