//! Request and response types for the HTTP API.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::{CreatedSession, Message};

// ============================================================================
// Chat Sessions
// ============================================================================

/// Body of `POST /api/create-chat-session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSessionData {
    pub session_id: String,
    pub model_type: String,
    pub mode: String,
    pub model_type_corrected: bool,
    pub mode_corrected: bool,
}

impl From<CreatedSession> for CreatedSessionData {
    fn from(created: CreatedSession) -> Self {
        Self {
            session_id: created.session_id,
            model_type: created.model_type.value.to_string(),
            mode: created.mode.value.to_string(),
            model_type_corrected: created.model_type.corrected,
            mode_corrected: created.mode.corrected,
        }
    }
}

/// `sessionId` is repeated at the top level for clients that read only that field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
    pub data: CreatedSessionData,
}

impl From<CreatedSession> for CreateSessionResponse {
    fn from(created: CreatedSession) -> Self {
        Self {
            success: true,
            message: "Chat session created successfully".to_string(),
            session_id: created.session_id.clone(),
            data: created.into(),
        }
    }
}

/// Body of `POST /api/send-message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<Message>,
}

// ============================================================================
// Analysis
// ============================================================================

/// Envelope for every single-shot analysis endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub data: Value,
    pub message: String,
    pub cached: bool,
}
