//! Generative model provider trait.

use async_trait::async_trait;
use futures::stream;

use super::error::LLMError;
use super::types::{Chunk, ChunkStream, GenerateRequest};

/// Trait for generative model backends.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a complete text result.
    async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError>;

    /// Generate a streamed result.
    ///
    /// Default implementation calls the non-streaming API and emits the full
    /// response as a single chunk. Override this for native incremental output.
    async fn generate_stream(&self, request: GenerateRequest) -> Result<ChunkStream, LLMError> {
        let text = self.generate(request).await?;
        Ok(Box::pin(stream::iter(vec![Ok(Chunk::Text(text))])))
    }
}
