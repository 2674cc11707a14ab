//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "medrag")]
#[command(about = "MedRAG - retrieval-augmented chest X-ray explanations", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize MedRAG configuration and database
    Init(commands::init::InitArgs),

    /// Caption an image, retrieve similar prior cases, and explain the findings
    Query(commands::query::QueryArgs),

    /// Caption an image without retrieval or generation
    Caption(commands::caption::CaptionArgs),

    /// Extract feature vectors for a batch of images
    Extract(commands::extract::ExtractArgs),

    /// Similarity index management
    #[command(subcommand)]
    Index(commands::index::IndexCommands),

    /// Demo account management
    #[command(subcommand)]
    User(commands::user::UserCommands),
}

/// Print a command error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        eprintln!("{}", serde_json::json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("{}", console::style(format!("Error: {err:#}")).red());
    }
    std::process::exit(1);
}
