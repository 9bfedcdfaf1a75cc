pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "complaint-admin")]
#[command(about = "Complaint Desk administration - schema setup and directory seeding")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the database schema and seed the superadmin")]
    InitDb(commands::init_db::InitDbArgs),

    #[command(about = "Create an enterprise and print its id")]
    CreateEnterprise(commands::enterprise::CreateEnterpriseArgs),

    #[command(about = "Create a user inside an enterprise")]
    CreateUser(commands::user::CreateUserArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Database handle plus the same services the server runs on
pub struct AdminContext {
    pub database: DatabaseManager,
    pub state: AppState,
}

impl AdminContext {
    pub async fn connect() -> anyhow::Result<Self> {
        let config = AppConfig::from_env().validate().context("invalid configuration")?;
        let database = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        let state = AppState::build(config, &database)?;
        Ok(Self { database, state })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let context = AdminContext::connect().await?;

    let result = match cli.command {
        Commands::InitDb(args) => commands::init_db::handle(args, &context, output_format).await,
        Commands::CreateEnterprise(args) => commands::enterprise::handle(args, &context, output_format).await,
        Commands::CreateUser(args) => commands::user::handle(args, &context, output_format).await,
    };

    context.database.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_user_with_defaults() {
        let cli = Cli::try_parse_from([
            "complaint-admin",
            "create-user",
            "alice",
            "--enterprise",
            "3",
            "--password",
            "pw",
        ])
        .unwrap();

        match cli.command {
            Commands::CreateUser(args) => {
                assert_eq!(args.username, "alice");
                assert_eq!(args.enterprise, 3);
                assert_eq!(args.role, crate::types::Role::Admin);
                assert_eq!(args.password.as_deref(), Some("pw"));
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn parses_init_db_reset_and_json_flag() {
        let cli = Cli::try_parse_from(["complaint-admin", "init-db", "--reset", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::InitDb(args) => assert!(args.reset),
            _ => panic!("expected init-db"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        let parsed = Cli::try_parse_from([
            "complaint-admin",
            "create-user",
            "alice",
            "--enterprise",
            "3",
            "--role",
            "root",
        ]);
        assert!(parsed.is_err());
    }
}
