use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{AdminContext, OutputFormat};

#[derive(Args, Debug)]
pub struct CreateEnterpriseArgs {
    /// Display name of the enterprise
    pub name: String,
}

pub async fn handle(args: CreateEnterpriseArgs, context: &AdminContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let enterprise = context.state.directory.create_enterprise(&args.name).await?;

    output_success(
        output_format,
        &format!("Enterprise '{}' created with id {}", enterprise.name, enterprise.id),
        Some(json!({ "id": enterprise.id, "name": enterprise.name })),
    )
}
