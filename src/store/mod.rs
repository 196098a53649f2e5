//! Durable storage for chat sessions.

pub mod error;
pub mod file;
pub mod session;

pub use error::{StorageError, StorageResult};
pub use file::FileSessionStore;
pub use session::SessionStore;
