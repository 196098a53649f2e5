//! Persistent, streaming chat sessions.
//!
//! A session fixes its model and persona at creation. Each turn records the
//! user message, replays the whole log to the model, streams the reply back,
//! and records the reply. Conversational turns never use the response cache.

pub mod instructions;
mod manager;
pub mod policy;
pub mod record;
mod stream;

pub use manager::{CreatedSession, SessionError, SessionManager};
pub use policy::{ChatMode, ModelType, Resolved, generation_config, resolve_mode, resolve_model_type};
pub use record::{Message, SessionRecord};
pub use stream::ReplyStream;
