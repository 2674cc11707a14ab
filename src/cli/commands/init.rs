//! Implementation of the `medrag init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::adapters::sqlite::{create_pool, initialize_database};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        lines.push(format!("Config written to {}", self.config_path.display()));
        if self.database_initialized {
            lines.push("Database initialized".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let config_dir = PathBuf::from(".medrag");
    let config_path = config_dir.join("config.yaml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Already initialized at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(&config_dir).context("Failed to create .medrag directory")?;

    let config = Config::default();
    let rendered = serde_yaml::to_string(&config).context("Failed to render default config")?;
    std::fs::write(&config_path, rendered).context("Failed to write config file")?;

    let database_url = format!("sqlite://{}", config.database.path);
    let pool = create_pool(&database_url, config.database.max_connections)
        .await
        .context("Failed to create the database")?;
    initialize_database(&pool)
        .await
        .context("Failed to run database migrations")?;

    output(
        &InitOutput {
            success: true,
            message: "Initialized MedRAG project".to_string(),
            config_path,
            database_initialized: true,
        },
        json_mode,
    );
    Ok(())
}
