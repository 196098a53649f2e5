//! Session storage trait.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::session::{Message, SessionRecord};

/// Storage interface for chat sessions.
///
/// A session is a fixed header (id, model, mode, creation time) plus an
/// append-only message log. Expired sessions are reported as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    // ========================================================================
    // Records
    // ========================================================================

    /// Persist a new session. Its message log starts empty.
    async fn create(&self, record: &SessionRecord) -> StorageResult<()>;

    /// Load a session with its full message log.
    ///
    /// Returns `Ok(None)` if the session does not exist or has expired.
    async fn find(&self, session_id: &str) -> StorageResult<Option<SessionRecord>>;

    /// Append one message to the session's log.
    ///
    /// Must be durable before returning. Fails with `NotFound` if the session
    /// does not exist.
    async fn append_message(&self, session_id: &str, message: &Message) -> StorageResult<()>;

    // ========================================================================
    // Index / Lifecycle
    // ========================================================================

    /// List all stored session IDs, expired or not.
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Delete a session and its log. Deleting a missing session succeeds.
    async fn delete(&self, session_id: &str) -> StorageResult<()>;

    /// Delete every expired session, returning how many were removed.
    async fn purge_expired(&self) -> StorageResult<usize>;
}
