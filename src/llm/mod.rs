//! Generative model access: provider trait, Gemini client, and the gateway
//! that adds timeouts, retries, and stream shaping.

mod error;
mod gateway;
mod gemini;
mod provider;
mod types;

pub use error::LLMError;
pub use gateway::{GatewayConfig, GenerationGateway, GenerationStream, StreamFailure};
pub use gemini::GeminiProvider;
pub use provider::GenerativeModel;
pub use types::{
    Chunk, ChunkStream, GenerateRequest, GenerationConfig, REASONING_MARKER, ReasoningConfig,
    Role, Turn,
};
