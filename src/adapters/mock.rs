//! Mock collaborators for testing.
//!
//! Each mock returns a canned response or a canned failure and counts how
//! often it was invoked, so tests can assert both degraded output and that a
//! stage was (or was not) reached.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::errors::{CaptionError, EmbeddingError, GenerationError, IndexError};
use crate::domain::ports::{
    AnswerGenerator, Captioner, EmbeddingProvider, SearchHit, SimilarityIndex,
};

/// Caption provider with a canned response.
pub struct MockCaptioner {
    caption: String,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockCaptioner {
    pub fn success(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            caption: String::new(),
            error: Some(error.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Captioner for MockCaptioner {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn caption(&self, _path: &Path) -> Result<String, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(CaptionError::Backend(message.clone())),
            None => Ok(self.caption.clone()),
        }
    }
}

/// Embedding provider with a canned vector.
pub struct MockEmbedder {
    vector: Vec<f32>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn success(vector: Vec<f32>) -> Self {
        Self {
            vector,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            vector: Vec::new(),
            error: Some(error.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn dimension(&self) -> usize {
        self.vector.len()
    }

    async fn embed(&self, _path: &Path) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(EmbeddingError::Backend(message.clone())),
            None => Ok(self.vector.clone()),
        }
    }
}

/// Similarity index with canned hits.
pub struct MockIndex {
    hits: Vec<SearchHit>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockIndex {
    pub fn with_hits(hits: Vec<(&str, f32)>) -> Self {
        Self {
            hits: hits
                .into_iter()
                .map(|(id, distance)| SearchHit {
                    id: id.to_string(),
                    distance,
                })
                .collect(),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            error: Some(error.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimilarityIndex for MockIndex {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn dimension(&self) -> usize {
        0
    }

    async fn search(&self, _vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(IndexError::Malformed(message.clone())),
            None => Ok(self.hits.iter().take(k).cloned().collect()),
        }
    }
}

/// Generation backend with a canned answer.
pub struct MockGenerator {
    answer: String,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn success(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            answer: String::new(),
            error: Some(error.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(GenerationError::Request(message.clone())),
            None => Ok(self.answer.clone()),
        }
    }
}
