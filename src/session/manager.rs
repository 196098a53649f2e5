//! Conversational session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::policy::{ChatMode, ModelType, Resolved, generation_config, resolve_mode, resolve_model_type};
use super::record::{Message, SessionRecord};
use super::stream::ReplyStream;
use crate::background::BackgroundTasks;
use crate::llm::{GenerateRequest, GenerationGateway, LLMError, Role};
use crate::store::{SessionStore, StorageError};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("session storage failed: {0}")]
    Persistence(#[from] StorageError),

    #[error("model request failed: {0}")]
    Upstream(#[from] LLMError),
}

// ============================================================================
// SessionManager
// ============================================================================

/// Result of `create_session`.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub session_id: String,
    pub model_type: Resolved<ModelType>,
    pub mode: Resolved<ChatMode>,
}

/// Creates sessions, runs conversational turns, and serves history.
///
/// Cloning is cheap; clones share the store, gateway, and task registry.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    gateway: GenerationGateway,
    background: BackgroundTasks,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateway: GenerationGateway,
        background: BackgroundTasks,
    ) -> Self {
        Self {
            store,
            gateway,
            background,
        }
    }

    /// Start a new session with an empty log.
    pub async fn create_session(
        &self,
        model_type: Option<&str>,
        mode: Option<&str>,
    ) -> Result<CreatedSession, SessionError> {
        let model_type = resolve_model_type(model_type);
        let mode = resolve_mode(mode);
        if model_type.corrected || mode.corrected {
            info!(
                model_type = %model_type.value,
                mode = %mode.value,
                model_corrected = model_type.corrected,
                mode_corrected = mode.corrected,
                "Substituted defaults for unrecognized session settings"
            );
        }

        let record = SessionRecord::new(model_type.value, mode.value);
        self.store.create(&record).await?;
        info!(
            session_id = %record.session_id,
            model_type = %record.model_type,
            mode = %record.mode,
            "Created chat session"
        );

        Ok(CreatedSession {
            session_id: record.session_id,
            model_type,
            mode,
        })
    }

    /// Run one conversational turn.
    ///
    /// The user turn is recorded before the model is contacted. The returned
    /// stream records the model turn once generation ends or the stream is
    /// dropped.
    pub async fn send_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ReplyStream, SessionError> {
        let mut record = self
            .store
            .find(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        let user_turn = Message::new(Role::User, text);
        if let Err(e) = self.store.append_message(session_id, &user_turn).await {
            warn!(session_id, error = %e, "Failed to record user turn");
        }
        record.messages.push(user_turn);

        let config = generation_config(record.mode, record.model_type);
        let contents = record.messages.iter().map(Message::to_turn).collect();
        let request = GenerateRequest::new(record.model_type.as_str(), contents, config);

        debug!(
            session_id,
            model_type = %record.model_type,
            mode = %record.mode,
            turns = record.messages.len(),
            "Starting reply stream"
        );
        let generation = self.gateway.generate_stream(request).await.inspect_err(|e| {
            warn!(session_id, error = %e, "Failed to start reply stream");
        })?;

        Ok(ReplyStream::new(
            generation,
            self.store.clone(),
            session_id.to_string(),
            self.background.clone(),
        ))
    }

    /// The session's messages in conversation order.
    pub async fn get_history(&self, session_id: &str) -> Result<Vec<Message>, SessionError> {
        self.store
            .find(session_id)
            .await?
            .map(|record| record.messages)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Periodically delete expired sessions until `shutdown` fires.
    pub fn spawn_purge_task(&self, interval: Duration, shutdown: CancellationToken) {
        let store = self.store.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => match store.purge_expired().await {
                        Ok(0) => {}
                        Ok(removed) => info!(removed, "Purged expired sessions"),
                        Err(e) => warn!(error = %e, "Session purge failed"),
                    },
                }
            }
        });
    }
}
