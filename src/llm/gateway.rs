//! Timeout, retry, and stream shaping around a [`GenerativeModel`].
//!
//! Synchronous calls and stream setup are bounded by the request timeout and
//! retried with exponential backoff when the failure is transient. Once a
//! stream is flowing nothing is retried; instead an idle timeout bounds the
//! wait for each chunk, and a failure is reported once together with the text
//! produced so far.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use thiserror::Error;
use tokio_stream::Elapsed;
use tracing::warn;

use super::error::LLMError;
use super::provider::GenerativeModel;
use super::types::{Chunk, ChunkStream, GenerateRequest};

type TimedChunks = Pin<Box<dyn Stream<Item = Result<Result<Chunk, LLMError>, Elapsed>> + Send>>;

/// Timing and retry policy for model calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    pub request_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            idle_timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Shared entry point for all model calls.
#[derive(Clone)]
pub struct GenerationGateway {
    model: Arc<dyn GenerativeModel>,
    config: GatewayConfig,
}

impl GenerationGateway {
    #[must_use]
    pub fn new(model: Arc<dyn GenerativeModel>, config: GatewayConfig) -> Self {
        Self { model, config }
    }

    /// Generate a complete text result.
    pub async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError> {
        self.with_retry(&request.model, || self.model.generate(request.clone()))
            .await
    }

    /// Open a text stream. Reasoning is folded in with its marker.
    pub async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationStream, LLMError> {
        let chunks = self
            .with_retry(&request.model, || self.model.generate_stream(request.clone()))
            .await?;
        Ok(GenerationStream::new(chunks, self.config.idle_timeout))
    }

    async fn with_retry<T, F, Fut>(&self, model: &str, mut call: F) -> Result<T, LLMError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LLMError>>,
    {
        let mut attempt = 0;
        loop {
            let error = match tokio::time::timeout(self.config.request_timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => LLMError::Timeout(self.config.request_timeout),
            };

            if attempt >= self.config.max_retries || !error.is_retryable() {
                return Err(error);
            }

            let delay = backoff_delay(self.config.retry_backoff, attempt);
            attempt += 1;
            warn!(model, attempt, error = %error, ?delay, "Retrying model call");
            tokio::time::sleep(delay).await;
        }
    }
}

/// `base * 2^attempt`, saturating at `Duration::MAX`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(Duration::MAX)
}

// ============================================================================
// Streaming
// ============================================================================

/// A stream that ended early. `partial` holds every text item already yielded.
#[derive(Debug, Error)]
#[error("generation stream failed: {error}")]
pub struct StreamFailure {
    pub partial: String,
    #[source]
    pub error: LLMError,
}

/// Finite stream of answer text.
///
/// Yields `Ok(text)` per chunk. On failure yields one `Err(StreamFailure)`
/// and then ends.
pub struct GenerationStream {
    inner: TimedChunks,
    idle_timeout: Duration,
    produced: String,
    done: bool,
}

impl GenerationStream {
    fn new(chunks: ChunkStream, idle_timeout: Duration) -> Self {
        Self {
            inner: Box::pin(tokio_stream::StreamExt::timeout(chunks, idle_timeout)),
            idle_timeout,
            produced: String::new(),
            done: false,
        }
    }

    fn fail(&mut self, error: LLMError) -> Poll<Option<Result<String, StreamFailure>>> {
        self.done = true;
        Poll::Ready(Some(Err(StreamFailure {
            partial: std::mem::take(&mut self.produced),
            error,
        })))
    }
}

impl Stream for GenerationStream {
    type Item = Result<String, StreamFailure>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        loop {
            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(Ok(chunk)))) => {
                    let text = chunk.into_text();
                    if text.is_empty() {
                        continue;
                    }
                    self.produced.push_str(&text);
                    return Poll::Ready(Some(Ok(text)));
                }
                Poll::Ready(Some(Ok(Err(e)))) => return self.fail(e),
                Poll::Ready(Some(Err(_elapsed))) => {
                    let idle = self.idle_timeout;
                    return self.fail(LLMError::Timeout(idle));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
