//! Implementation of the `medrag index` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::adapters::index::FlatIndex;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::ports::SimilarityIndex;
use crate::infrastructure::config::ConfigLoader;

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Build the index from a directory of feature files
    Build {
        /// Directory of per-case feature files
        #[arg(long, default_value = "models/features")]
        features_dir: PathBuf,

        /// Output index path (defaults to the configured index path)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show dimension, vector count, and known case identifiers
    Stats {
        /// Index path (defaults to the configured index path)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct BuildOutput {
    pub path: PathBuf,
    pub dimension: usize,
    pub count: usize,
}

impl CommandOutput for BuildOutput {
    fn to_human(&self) -> String {
        format!(
            "Saved index with {} vector(s) of dimension {} to {}",
            self.count,
            self.dimension,
            self.path.display()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatsOutput {
    pub path: PathBuf,
    pub dimension: usize,
    pub count: usize,
    pub cases: Vec<String>,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let preview = truncate(&self.cases.join(", "), 120);
        format!(
            "Index {}\n  dimension: {}\n  vectors:   {}\n  cases:     {}",
            self.path.display(),
            self.dimension,
            self.count,
            if preview.is_empty() {
                "(sidecar missing)"
            } else {
                preview.as_str()
            }
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(command: IndexCommands, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let default_path = PathBuf::from(&config.index.path);

    match command {
        IndexCommands::Build { features_dir, out } => {
            let out = out.unwrap_or(default_path);
            let index = FlatIndex::build_from_dir(&features_dir)
                .with_context(|| format!("Failed to build index from {}", features_dir.display()))?;
            index
                .write(&out)
                .with_context(|| format!("Failed to write index to {}", out.display()))?;

            output(
                &BuildOutput {
                    path: out,
                    dimension: index.dimension(),
                    count: index.len(),
                },
                json_mode,
            );
        }
        IndexCommands::Stats { path } => {
            let path = path.unwrap_or(default_path);
            let index = FlatIndex::open(&path)
                .with_context(|| format!("Failed to open index at {}", path.display()))?;

            output(
                &StatsOutput {
                    dimension: index.dimension(),
                    count: index.len(),
                    cases: index.ids().to_vec(),
                    path,
                },
                json_mode,
            );
        }
    }

    Ok(())
}
