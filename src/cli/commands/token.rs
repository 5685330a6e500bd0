use clap::Subcommand;
use serde_json::json;

use crate::auth::generate_token;
use crate::cli::{utils::output_success, OutputFormat};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a signed token (requires SECRET_KEY)")]
    Issue {
        #[arg(long, help = "Subject id")]
        id: String,
        #[arg(long, help = "Subject kind, stored as the `type` claim")]
        kind: String,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { id, kind } => {
            let token = generate_token(&id, &kind)?;
            match output_format {
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
                OutputFormat::Json => output_success(&output_format, "Token issued", Some(json!({ "token": token }))),
            }
        }
    }
}
