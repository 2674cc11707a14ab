//! Implementation of the `medrag user` commands.
//!
//! Thin CLI over the demo account store. Passwords travel as plain command
//! arguments and are digested without a salt; this surface exists for the
//! demo only.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::adapters::sqlite::{create_pool, initialize_database, SqliteUserRepository};
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::config::ConfigLoader;
use crate::services::AccountService;

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a new account
    Register {
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Check credentials against the store
    Login {
        email: String,

        #[arg(long)]
        password: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct UserOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for UserOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(command: UserCommands, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let database_url = format!("sqlite://{}", config.database.path);

    let pool = create_pool(&database_url, config.database.max_connections)
        .await
        .context("Failed to open the account database")?;
    initialize_database(&pool)
        .await
        .context("Failed to run database migrations")?;

    let service = AccountService::new(Arc::new(SqliteUserRepository::new(pool)));

    let result = match command {
        UserCommands::Register { email, password } => {
            match service.register(&email, &password).await? {
                Some(account) => UserOutput {
                    success: true,
                    message: format!("Registered {}", account.email),
                },
                None => UserOutput {
                    success: false,
                    message: format!("{email} is already registered"),
                },
            }
        }
        UserCommands::Login { email, password } => {
            match service.login(&email, &password).await? {
                Some(account) => UserOutput {
                    success: true,
                    message: format!("Welcome back, {}", account.email),
                },
                None => UserOutput {
                    success: false,
                    message: "Invalid email or password".to_string(),
                },
            }
        }
    };

    output(&result, json_mode);
    Ok(())
}
