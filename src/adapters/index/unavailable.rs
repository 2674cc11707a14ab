//! Placeholder index used when the on-disk index could not be opened.
//!
//! Keeps the pipeline wired with a collaborator whose every search reports
//! the original open failure, so retrieval degrades instead of startup
//! aborting.

use async_trait::async_trait;

use crate::domain::errors::IndexError;
use crate::domain::ports::{SearchHit, SimilarityIndex};

pub struct UnavailableIndex {
    reason: String,
}

impl UnavailableIndex {
    pub fn new(cause: &IndexError) -> Self {
        Self {
            reason: cause.to_string(),
        }
    }
}

#[async_trait]
impl SimilarityIndex for UnavailableIndex {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn dimension(&self) -> usize {
        0
    }

    async fn search(&self, _vector: &[f32], _k: usize) -> Result<Vec<SearchHit>, IndexError> {
        Err(IndexError::Unavailable(self.reason.clone()))
    }
}
