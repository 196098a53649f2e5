//! HTTP request handlers.

pub mod analysis;
pub mod chat;
mod health;
pub(crate) mod problem_details;

pub use health::{livez, readyz, version, welcome};
