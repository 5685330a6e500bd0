use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::mailchimp::Credential;

#[derive(Subcommand)]
pub enum KeyCommands {
    #[command(about = "Encode a raw API key for use in proxy URLs")]
    Encode {
        #[arg(help = "Mailchimp API key, e.g. 0123abcd-us6")]
        api_key: String,
    },

    #[command(about = "Decode an encoded key and show its data center")]
    Inspect {
        #[arg(help = "Base64-encoded API key")]
        encoded: String,
    },
}

pub fn handle(cmd: KeyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        KeyCommands::Encode { api_key } => {
            // Validate before encoding so a typo is caught here, not at request time
            Credential::from_secret(api_key.trim())?;
            let encoded = Credential::encode(api_key.trim());
            match output_format {
                OutputFormat::Text => {
                    println!("{}", encoded);
                    Ok(())
                }
                OutputFormat::Json => output_success(&output_format, "Key encoded", Some(json!({ "encoded": encoded }))),
            }
        }
        KeyCommands::Inspect { encoded } => {
            let credential = Credential::from_encoded(&encoded)?;
            output_success(
                &output_format,
                &format!("Data center: {}", credential.data_center()),
                Some(json!({ "data_center": credential.data_center() })),
            )
        }
    }
}
