use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{credential, present, AppState, JsonBody};
use crate::api::envelope::{ApiResult, Reply};
use crate::error::ApiError;
use crate::mailchimp::{ApiPath, Call};

#[derive(Debug, Default, Deserialize)]
pub struct SignupFormBody {
    pub title: Option<String>,
    pub header_text: Option<String>,
    pub header_image_url: Option<String>,
    pub footer: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub subject: Option<String>,
}

impl SignupFormBody {
    /// Only the fields that were given; header parts nest under `header`.
    fn customization(&self) -> Map<String, Value> {
        fn put(map: &mut Map<String, Value>, key: &str, field: &Option<String>) {
            if let Some(value) = present(field) {
                map.insert(key.into(), Value::String(value.into()));
            }
        }

        let mut data = Map::new();

        put(&mut data, "title", &self.title);

        let mut header = Map::new();
        put(&mut header, "text", &self.header_text);
        put(&mut header, "image_url", &self.header_image_url);
        if !header.is_empty() {
            data.insert("header".into(), Value::Object(header));
        }

        put(&mut data, "footer", &self.footer);
        put(&mut data, "from_name", &self.from_name);
        put(&mut data, "from_email", &self.from_email);
        put(&mut data, "subject", &self.subject);
        data
    }
}

/// POST /api/mailchimp/customize-signup-form/:apiKey/:listId
pub async fn customize_signup_form(
    State(state): State<AppState>,
    Path((api_key, list_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<SignupFormBody>,
) -> ApiResult {
    let credential = credential(&api_key)?;

    let data = body.customization();
    if data.is_empty() {
        return Err(ApiError::bad_request("No customization parameters provided"));
    }

    let path = ApiPath::new(["lists", list_id.as_str(), "signup-forms"]);
    let result = state
        .client()
        .send(&credential, Call::post(path, Value::Object(data)))
        .await?;
    Ok(Reply::Data.respond(result))
}
