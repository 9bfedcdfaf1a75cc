use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{AdminContext, OutputFormat};
use crate::database::schema::init_schema;

#[derive(Args, Debug)]
pub struct InitDbArgs {
    /// Drop existing tables first. Destroys all data.
    #[arg(long)]
    pub reset: bool,
}

pub async fn handle(args: InitDbArgs, context: &AdminContext, output_format: OutputFormat) -> anyhow::Result<()> {
    init_schema(context.database.pool(), args.reset)
        .await
        .context("schema initialisation failed")?;

    let superadmin = match context.state.config.bootstrap.superadmin() {
        Some((username, password)) => {
            let created = context.state.directory.ensure_superadmin(username, password).await?;
            json!({ "username": username, "created": created.is_some() })
        }
        None => {
            tracing::warn!("SUPERADMIN_USERNAME/SUPERADMIN_PASSWORD not set; no superadmin seeded");
            json!(null)
        }
    };

    let message = if args.reset {
        "Database reset and initialised"
    } else {
        "Database initialised"
    };
    output_success(output_format, message, Some(json!({ "reset": args.reset, "superadmin": superadmin })))
}
