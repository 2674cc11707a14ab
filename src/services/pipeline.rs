//! Retrieval-augmented explanation pipeline.
//!
//! Orchestrates caption, retrieval, prompt composition, answer generation,
//! and the severity gate for one X-ray image. The defining property is
//! graceful degradation: no collaborator failure aborts a query. Each stage
//! catches its own errors and substitutes a clearly marked placeholder, so
//! the returned [`QueryResult`] always carries all three fields.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::{EmbeddingError, IndexError, QueryError};
use crate::domain::models::{QueryResult, Severity};
use crate::domain::ports::{AnswerGenerator, Captioner, EmbeddingProvider, SimilarityIndex};
use crate::services::severity;

/// Either half of the retrieval stage failing degrades the stage as a whole.
#[derive(Debug, Error)]
enum RetrievalError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// The RAG query pipeline.
///
/// Collaborators are constructed once at startup and shared by reference;
/// the pipeline itself holds no mutable state and each query allocates a
/// fresh set of request-scoped values.
pub struct RagPipeline {
    captioner: Arc<dyn Captioner>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    /// `None` when no generation credential is configured. This is a distinct
    /// state from a configured-but-failing backend and produces a different
    /// fallback answer.
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl RagPipeline {
    pub fn new(
        captioner: Arc<dyn Captioner>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
        generator: Option<Arc<dyn AnswerGenerator>>,
    ) -> Self {
        Self {
            captioner,
            embedder,
            index,
            generator,
        }
    }

    /// Run one query: caption the image, retrieve up to `k` similar prior
    /// cases, generate a plain-language explanation, and soften it when the
    /// severity gate fires.
    ///
    /// The only hard failure is `k == 0`, rejected before any collaborator is
    /// invoked. Every collaborator error is converted into the documented
    /// degraded value for its field.
    pub async fn query(&self, image: &Path, k: usize) -> Result<QueryResult, QueryError> {
        if k == 0 {
            return Err(QueryError::InvalidNeighborCount(k));
        }

        let query_id = Uuid::new_v4();
        tracing::info!(%query_id, image = %image.display(), k, "starting query");

        // 1) caption
        let caption = match self.captioner.caption(image).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(%query_id, error = %err, "captioning failed");
                format!("[Captioning failed: {err}]")
            }
        };

        // 2) embed + nearest neighbors
        let retrieved = match self.retrieve(image, k).await {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(%query_id, error = %err, "retrieval failed");
                Vec::new()
            }
        };

        // 3) prompt
        let prompt = compose_prompt(&caption, &retrieved);

        // 4) generate, or fall back to the caption
        let working_answer = match &self.generator {
            Some(generator) => match generator.generate(&prompt).await {
                Ok(text) => text.trim().to_string(),
                Err(err) => {
                    tracing::warn!(
                        %query_id,
                        backend = generator.name(),
                        error = %err,
                        "generation failed, using caption as fallback"
                    );
                    format!("{caption}\n\n[Generation call failed: using caption as fallback]")
                }
            },
            None => {
                tracing::debug!(%query_id, "no generation backend configured");
                format!("(No generation backend configured) Caption: {caption}")
            }
        };

        // 5) severity gate
        let tier = severity::classify(&working_answer);
        let answer = if tier == Severity::High {
            tracing::info!(%query_id, severity = %tier, "applying supportive rewrite");
            severity::supportive_rewrite(&working_answer)
        } else {
            working_answer
        };

        Ok(QueryResult {
            caption,
            retrieved,
            answer,
        })
    }

    async fn retrieve(&self, image: &Path, k: usize) -> Result<Vec<String>, RetrievalError> {
        let vector = self.embedder.embed(image).await?;
        let hits = self.index.search(&vector, k).await?;
        Ok(hits.into_iter().map(|hit| hit.id).collect())
    }
}

/// Build the generation prompt deterministically.
///
/// Fixed section order: caption block, neighbor block (only when neighbors
/// were retrieved, nearest first), instruction block. Blocks are separated by
/// a blank line.
pub fn compose_prompt(caption: &str, retrieved: &[String]) -> String {
    let mut parts = vec![format!("Image caption: {caption}")];

    if !retrieved.is_empty() {
        parts.push(format!("Relevant prior case IDs: {}", retrieved.join(", ")));
    }

    parts.push(
        "Explain the caption above in plain language for a patient and suggest 3 questions \
         they can ask their doctor. Be empathetic but do not provide a medical diagnosis. \
         Keep it concise."
            .to_string(),
    );

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockCaptioner, MockEmbedder, MockGenerator, MockIndex};

    fn image() -> &'static Path {
        Path::new("scan_0001.png")
    }

    fn pipeline(
        captioner: MockCaptioner,
        embedder: MockEmbedder,
        index: MockIndex,
        generator: Option<MockGenerator>,
    ) -> RagPipeline {
        RagPipeline::new(
            Arc::new(captioner),
            Arc::new(embedder),
            Arc::new(index),
            generator.map(|g| Arc::new(g) as Arc<dyn AnswerGenerator>),
        )
    }

    #[tokio::test]
    async fn zero_k_is_rejected_before_any_collaborator_runs() {
        let captioner = Arc::new(MockCaptioner::success("caption"));
        let embedder = Arc::new(MockEmbedder::success(vec![0.0; 4]));
        let index = Arc::new(MockIndex::with_hits(vec![("case_a", 0.1)]));
        let generator = Arc::new(MockGenerator::success("answer"));

        let pipeline = RagPipeline::new(
            captioner.clone(),
            embedder.clone(),
            index.clone(),
            Some(generator.clone() as Arc<dyn AnswerGenerator>),
        );

        let err = pipeline.query(image(), 0).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidNeighborCount(0)));

        assert_eq!(captioner.call_count(), 0);
        assert_eq!(embedder.call_count(), 0);
        assert_eq!(index.call_count(), 0);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn neighbor_order_is_preserved_nearest_first() {
        let pipeline = pipeline(
            MockCaptioner::success("Normal chest radiograph"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![("case_a", 0.1), ("case_b", 0.2)]),
            Some(MockGenerator::success("This looks normal.")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert_eq!(result.retrieved, vec!["case_a", "case_b"]);
    }

    #[tokio::test]
    async fn caption_failure_degrades_only_the_caption() {
        let pipeline = pipeline(
            MockCaptioner::failure("model exploded"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![("case_a", 0.1)]),
            Some(MockGenerator::success("This looks normal.")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert!(result.caption.starts_with("[Captioning failed:"));
        assert!(result.caption.contains("model exploded"));
        assert_eq!(result.retrieved, vec!["case_a"]);
        assert_eq!(result.answer, "This looks normal.");
    }

    #[tokio::test]
    async fn embedding_failure_yields_empty_neighbors() {
        let pipeline = pipeline(
            MockCaptioner::success("Normal chest radiograph"),
            MockEmbedder::failure("backend down"),
            MockIndex::with_hits(vec![("case_a", 0.1)]),
            Some(MockGenerator::success("This looks normal.")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert!(result.retrieved.is_empty());
        assert_eq!(result.caption, "Normal chest radiograph");
        assert_eq!(result.answer, "This looks normal.");
    }

    #[tokio::test]
    async fn index_failure_yields_empty_neighbors() {
        let pipeline = pipeline(
            MockCaptioner::success("Normal chest radiograph"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::failure("index corrupt"),
            Some(MockGenerator::success("This looks normal.")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert!(result.retrieved.is_empty());
        assert_eq!(result.answer, "This looks normal.");
    }

    #[tokio::test]
    async fn generation_failure_falls_back_to_the_caption() {
        let pipeline = pipeline(
            MockCaptioner::success("Normal chest radiograph"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![("case_a", 0.1)]),
            Some(MockGenerator::failure("rate limited")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert_eq!(
            result.answer,
            "Normal chest radiograph\n\n[Generation call failed: using caption as fallback]"
        );
    }

    #[tokio::test]
    async fn all_collaborators_failing_still_returns_a_result() {
        let pipeline = pipeline(
            MockCaptioner::failure("down"),
            MockEmbedder::failure("down"),
            MockIndex::failure("down"),
            Some(MockGenerator::failure("down")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert!(result.caption.starts_with("[Captioning failed:"));
        assert!(result.retrieved.is_empty());
        assert!(result
            .answer
            .contains("[Generation call failed: using caption as fallback]"));
    }

    #[tokio::test]
    async fn high_severity_caption_without_backend_gets_supportive_rewrite() {
        let pipeline = pipeline(
            MockCaptioner::success("Findings consistent with pneumothorax"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![]),
            None,
        );

        let result = pipeline.query(image(), 5).await.unwrap();

        let fallback =
            "(No generation backend configured) Caption: Findings consistent with pneumothorax";
        assert_eq!(result.answer, severity::supportive_rewrite(fallback));
        assert!(result.answer.contains("This is not a diagnosis"));
    }

    #[tokio::test]
    async fn low_severity_answer_passes_through_unchanged() {
        let pipeline = pipeline(
            MockCaptioner::success("Normal chest radiograph"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![]),
            Some(MockGenerator::success("This looks normal.")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert_eq!(result.answer, "This looks normal.");
    }

    #[tokio::test]
    async fn generated_answer_is_trimmed() {
        let pipeline = pipeline(
            MockCaptioner::success("Normal chest radiograph"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![]),
            Some(MockGenerator::success("  This looks normal.\n")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert_eq!(result.answer, "This looks normal.");
    }

    #[tokio::test]
    async fn high_severity_generated_answer_is_rewritten() {
        let pipeline = pipeline(
            MockCaptioner::success("caption"),
            MockEmbedder::success(vec![0.0; 4]),
            MockIndex::with_hits(vec![]),
            Some(MockGenerator::success("There is a suspicious mass.")),
        );

        let result = pipeline.query(image(), 5).await.unwrap();
        assert_eq!(
            result.answer,
            severity::supportive_rewrite("There is a suspicious mass.")
        );
        assert!(result.answer.contains("There is a suspicious mass."));
    }

    #[test]
    fn prompt_contains_caption_and_neighbors_in_order() {
        let retrieved = vec!["case_a".to_string(), "case_b".to_string()];
        let prompt = compose_prompt("Normal chest radiograph", &retrieved);

        assert!(prompt.starts_with("Image caption: Normal chest radiograph"));
        assert!(prompt.contains("Relevant prior case IDs: case_a, case_b"));
        assert!(prompt.contains("do not provide a medical diagnosis"));

        let caption_pos = prompt.find("Image caption").unwrap();
        let neighbors_pos = prompt.find("Relevant prior case IDs").unwrap();
        let instruction_pos = prompt.find("Explain the caption").unwrap();
        assert!(caption_pos < neighbors_pos);
        assert!(neighbors_pos < instruction_pos);
    }

    #[test]
    fn prompt_omits_neighbor_block_when_retrieval_was_empty() {
        let prompt = compose_prompt("Normal chest radiograph", &[]);
        assert!(!prompt.contains("Relevant prior case IDs"));
        assert_eq!(prompt.matches("\n\n").count(), 1);
    }
}
