//! Caption provider port.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::CaptionError;

/// Trait for caption providers.
///
/// A captioner turns an image on disk into a short natural-language
/// description of its visual content.
#[async_trait]
pub trait Captioner: Send + Sync {
    /// Provider name (e.g., "blip-http", "static").
    fn name(&self) -> &'static str;

    /// Generate a caption for the image at `path`.
    async fn caption(&self, path: &Path) -> Result<String, CaptionError>;
}
