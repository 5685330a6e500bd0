use serde_json::{json, Value};

use crate::cli::{
    utils::{output_error, output_success},
    OutputFormat,
};
use crate::config;
use crate::mailchimp::{ApiPath, Call, Credential, MailchimpClient};

/// GET /ping through the same client the server uses.
pub async fn handle(encoded: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let credential = Credential::from_encoded(encoded)?;
    let client = MailchimpClient::from_config(&config::config().mailchimp)?;

    match client.send(&credential, Call::get(ApiPath::new(["ping"]))).await {
        Ok(body) => {
            let status = body
                .get("health_status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            output_success(
                &output_format,
                &format!("{} ({})", status, credential.data_center()),
                Some(json!({ "data_center": credential.data_center(), "health_status": status })),
            )
        }
        Err(e) => {
            output_error(&output_format, &e.to_string(), Some("UPSTREAM_ERROR"))?;
            Err(e.into())
        }
    }
}
