//! MedRAG CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medrag::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => medrag::cli::commands::init::execute(args, cli.json).await,
        Commands::Query(args) => medrag::cli::commands::query::execute(args, cli.json).await,
        Commands::Caption(args) => medrag::cli::commands::caption::execute(args, cli.json).await,
        Commands::Extract(args) => medrag::cli::commands::extract::execute(args, cli.json).await,
        Commands::Index(command) => medrag::cli::commands::index::execute(command, cli.json).await,
        Commands::User(command) => medrag::cli::commands::user::execute(command, cli.json).await,
    };

    if let Err(err) = result {
        medrag::cli::handle_error(err, cli.json);
    }
}
