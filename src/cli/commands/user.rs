use anyhow::bail;
use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{AdminContext, OutputFormat};
use crate::services::CreateUser;
use crate::types::Role;

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    pub username: String,

    /// Owning enterprise id
    #[arg(long)]
    pub enterprise: i32,

    #[arg(long, default_value = "admin")]
    pub role: Role,

    #[arg(long, env = "COMPLAINT_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub async fn handle(args: CreateUserArgs, context: &AdminContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let Some(password) = args.password else {
        bail!("a password is required: pass --password or set COMPLAINT_ADMIN_PASSWORD");
    };

    let user = context
        .state
        .directory
        .create_user(CreateUser {
            username: args.username,
            password,
            enterprise_id: args.enterprise,
            role: args.role,
        })
        .await?;

    output_success(
        output_format,
        &format!("User '{}' created with id {}", user.username, user.id),
        Some(json!({ "id": user.id, "username": user.username, "enterprise_id": user.enterprise_id, "role": user.role })),
    )
}
