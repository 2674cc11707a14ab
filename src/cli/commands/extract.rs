//! Implementation of the `medrag extract` command.
//!
//! Walks a batch of images, embeds each through the configured provider, and
//! writes one feature file per case. A single bad image never aborts the
//! batch; failures are collected and reported at the end.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indicatif::ProgressBar;

use crate::adapters::index::write_feature_file;
use crate::adapters::inference::{HttpEmbeddingConfig, HttpEmbeddingProvider};
use crate::cli::output::{output, CommandOutput};
use crate::domain::ports::EmbeddingProvider;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Image files to embed
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Output directory for feature files
    #[arg(long, default_value = "models/features")]
    pub out_dir: PathBuf,

    /// Skip images whose feature file already exists
    #[arg(long)]
    pub resume: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ExtractOutput {
    pub extracted: usize,
    pub skipped: usize,
    pub failures: Vec<ExtractFailure>,
}

#[derive(Debug, serde::Serialize)]
pub struct ExtractFailure {
    pub image: PathBuf,
    pub error: String,
}

impl CommandOutput for ExtractOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Extracted {} feature file(s), skipped {}.",
            self.extracted, self.skipped
        )];
        if !self.failures.is_empty() {
            lines.push(format!("{} image(s) failed:", self.failures.len()));
            for failure in &self.failures {
                lines.push(format!("  - {}: {}", failure.image.display(), failure.error));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ExtractArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let embedder = HttpEmbeddingProvider::new(HttpEmbeddingConfig::from_config(&config.embedding));

    let bar = if json_mode {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.images.len() as u64)
    };

    let mut extracted = 0usize;
    let mut skipped = 0usize;
    let mut failures = Vec::new();

    for image in &args.images {
        let stem = image
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let out_path = args.out_dir.join(format!("{stem}.vec"));

        if args.resume && out_path.exists() {
            skipped += 1;
            bar.inc(1);
            continue;
        }

        match embedder.embed(image).await {
            Ok(vector) => match write_feature_file(&out_path, &vector) {
                Ok(()) => extracted += 1,
                Err(err) => failures.push(ExtractFailure {
                    image: image.clone(),
                    error: err.to_string(),
                }),
            },
            Err(err) => failures.push(ExtractFailure {
                image: image.clone(),
                error: err.to_string(),
            }),
        }
        bar.inc(1);
    }

    bar.finish_and_clear();

    output(
        &ExtractOutput {
            extracted,
            skipped,
            failures,
        },
        json_mode,
    );
    Ok(())
}
