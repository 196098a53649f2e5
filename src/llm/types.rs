//! Common types for generative-model requests and streamed output.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use super::error::LLMError;

// ============================================================================
// Request Types
// ============================================================================

/// Speaker of a conversational turn, in the provider's vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

/// One conversational turn sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Extended reasoning ("thinking") settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasoningConfig {
    pub budget: u32,
}

/// Per-request generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationConfig {
    pub system_instruction: Option<String>,
    pub reasoning: Option<ReasoningConfig>,
}

/// A generation request: model identifier, ordered turns, and config.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Turn>,
    pub config: GenerationConfig,
}

impl GenerateRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, contents: Vec<Turn>, config: GenerationConfig) -> Self {
        Self {
            model: model.into(),
            contents,
            config,
        }
    }

    /// A one-shot request with a single user turn.
    #[must_use]
    pub fn single(
        model: impl Into<String>,
        prompt: impl Into<String>,
        system_instruction: Option<String>,
    ) -> Self {
        Self::new(
            model,
            vec![Turn::user(prompt)],
            GenerationConfig {
                system_instruction,
                reasoning: None,
            },
        )
    }
}

// ============================================================================
// Streaming Types
// ============================================================================

/// Marker prepended to reasoning text when it is folded into the answer stream.
pub const REASONING_MARKER: &str = "THINKING PROCESS: ";

/// One incremental unit of streamed model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Final-answer text.
    Text(String),
    /// Reasoning trace the provider reported separately from the answer.
    Reasoning(String),
}

impl Chunk {
    /// Render the chunk as answer-stream text.
    ///
    /// Reasoning is relabeled with [`REASONING_MARKER`] and ends with a newline.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Chunk::Text(text) => text,
            Chunk::Reasoning(text) => format!("{REASONING_MARKER}{text}\n"),
        }
    }
}

/// A boxed stream of provider chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk, LLMError>> + Send>>;
