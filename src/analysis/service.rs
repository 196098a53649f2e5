//! Cached single-shot generation.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::fingerprint::fingerprint;
use crate::llm::{GenerateRequest, GenerationGateway, LLMError};

/// A normalized request for one cached, non-conversational generation.
pub trait AnalysisRequest: Serialize + Send + Sync {
    /// Fingerprint scope; also names the endpoint in logs.
    const SCOPE: &'static str;
    /// Response message for a fresh result.
    const GENERATED_MESSAGE: &'static str;
    /// Response message for a cached result.
    const CACHED_MESSAGE: &'static str;

    /// Provider model identifier.
    fn model(&self) -> &str;

    fn system_instruction(&self) -> Option<&'static str> {
        None
    }

    /// Deterministic prompt built from the payload.
    fn prompt(&self) -> String;

    /// Semantic checks beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Turn raw model text into the cached value.
    fn shape(&self, text: String) -> Value {
        Value::String(text)
    }
}

/// A generation result and whether it came from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub data: Value,
    pub cached: bool,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("model request failed: {0}")]
    Upstream(#[from] LLMError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Memoized generation over the response cache.
#[derive(Clone)]
pub struct AnalysisService {
    cache: ResponseCache,
    gateway: GenerationGateway,
}

impl AnalysisService {
    #[must_use]
    pub fn new(cache: ResponseCache, gateway: GenerationGateway) -> Self {
        Self { cache, gateway }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Return the cached result for `request`, generating and caching it on a miss.
    ///
    /// Failed generations are not cached.
    pub async fn analyze<R: AnalysisRequest>(&self, request: &R) -> Result<Analysis, AnalysisError> {
        request.validate().map_err(AnalysisError::Validation)?;

        let payload =
            serde_json::to_value(request).map_err(|e| AnalysisError::Internal(e.to_string()))?;
        let key = fingerprint(R::SCOPE, &payload);

        if let Some(data) = self.cache.get(&key) {
            debug!(scope = R::SCOPE, key = %key, "Cache hit");
            return Ok(Analysis { data, cached: true });
        }
        debug!(scope = R::SCOPE, key = %key, "Cache miss");

        let generation = GenerateRequest::single(
            request.model(),
            request.prompt(),
            request.system_instruction().map(str::to_string),
        );
        let text = self.gateway.generate(generation).await?;

        let data = request.shape(text);
        self.cache.set(key, data.clone());
        Ok(Analysis {
            data,
            cached: false,
        })
    }
}
