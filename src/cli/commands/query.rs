//! Implementation of the `medrag query` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Table;

use crate::adapters::index::{FlatIndex, UnavailableIndex};
use crate::adapters::inference::{
    HttpCaptioner, HttpCaptionerConfig, HttpEmbeddingConfig, HttpEmbeddingProvider,
};
use crate::adapters::llm::{OpenAiGenerator, OpenAiGeneratorConfig};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, QueryResult};
use crate::domain::ports::{AnswerGenerator, SimilarityIndex};
use crate::infrastructure::config::ConfigLoader;
use crate::services::RagPipeline;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Path to the X-ray image
    pub image: PathBuf,

    /// Number of similar prior cases to retrieve
    #[arg(short = 'k', long = "neighbors", default_value = "5")]
    pub neighbors: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct QueryOutput {
    #[serde(flatten)]
    pub result: QueryResult,
}

impl CommandOutput for QueryOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("{}", console::style("Caption").bold()),
            self.result.caption.clone(),
            String::new(),
        ];

        lines.push(format!("{}", console::style("Similar prior cases").bold()));
        if self.result.retrieved.is_empty() {
            lines.push("(none retrieved)".to_string());
        } else {
            let mut table = Table::new();
            table.set_header(vec!["Rank", "Case"]);
            for (rank, case) in self.result.retrieved.iter().enumerate() {
                table.add_row(vec![(rank + 1).to_string(), case.clone()]);
            }
            lines.push(table.to_string());
        }

        lines.push(String::new());
        lines.push(format!("{}", console::style("Answer").bold()));
        lines.push(self.result.answer.clone());

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: QueryArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pipeline = build_pipeline(&config);

    let result = pipeline
        .query(&args.image, args.neighbors)
        .await
        .context("Query failed")?;

    output(&QueryOutput { result }, json_mode);
    Ok(())
}

/// Wire the pipeline from configuration.
///
/// The generation gateway is attached only when a credential resolves; an
/// unopenable index is replaced by a placeholder so retrieval degrades per
/// query instead of failing startup.
pub fn build_pipeline(config: &Config) -> RagPipeline {
    let captioner = Arc::new(HttpCaptioner::new(HttpCaptionerConfig::from_config(
        &config.caption,
    )));
    let embedder = Arc::new(HttpEmbeddingProvider::new(HttpEmbeddingConfig::from_config(
        &config.embedding,
    )));

    let index: Arc<dyn SimilarityIndex> = match FlatIndex::open(Path::new(&config.index.path)) {
        Ok(index) => Arc::new(index),
        Err(err) => {
            tracing::warn!(error = %err, path = %config.index.path, "similarity index unavailable");
            Arc::new(UnavailableIndex::new(&err))
        }
    };

    let generator = OpenAiGenerator::from_config(OpenAiGeneratorConfig::from_config(
        &config.generation,
    ))
    .map(|gateway| Arc::new(gateway) as Arc<dyn AnswerGenerator>);
    if generator.is_none() {
        tracing::info!("no generation credential configured, answers will fall back to captions");
    }

    RagPipeline::new(captioner, embedder, index, generator)
}
