//! Health Connect - Gemini-backed health analysis and streaming chat service.
//!
//! Single-shot analyses are memoized in a content-addressed response cache;
//! chat sessions are persisted append-only and streamed back as plain text.

pub mod analysis;
pub mod api;
pub mod background;
pub mod build_info;
pub mod cache;
pub mod config;
pub mod fingerprint;
pub mod handlers;
pub mod llm;
pub mod server;
pub mod session;
pub mod sse_parser;
pub mod store;
