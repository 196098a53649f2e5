//! Chat session HTTP handlers.

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{
    CreateSessionRequest, CreateSessionResponse, HistoryResponse, SendMessageRequest,
};
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::session::SessionError;

const STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

fn session_error(e: SessionError) -> Response {
    match e {
        SessionError::NotFound(_) => problem_details::not_found("Session not found").into_response(),
        SessionError::Upstream(e) => {
            error!(error = %e, "Model request failed");
            problem_details::bad_gateway(format!("model request failed: {e}")).into_response()
        }
        SessionError::Persistence(e) => {
            error!(error = %e, "Session storage failed");
            problem_details::internal_error("session storage failed").into_response()
        }
    }
}

/// POST /api/create-chat-session
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    // Both fields are optional, so an empty body is accepted.
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        match serde_json::from_slice::<CreateSessionRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                return problem_details::bad_request(format!("invalid request body: {e}"))
                    .into_response();
            }
        }
    };

    match state
        .sessions
        .create_session(req.model_type.as_deref(), req.mode.as_deref())
        .await
    {
        Ok(created) => (StatusCode::OK, Json(CreateSessionResponse::from(created))).into_response(),
        Err(e) => session_error(e),
    }
}

/// POST /api/send-message
///
/// Streams the reply as chunked plain text. Errors after the first byte end
/// the stream without a structured body.
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return problem_details::from_json_rejection(rejection).into_response(),
    };
    if req.session_id.is_empty() {
        return problem_details::bad_request("sessionId is required").into_response();
    }
    if req.message.is_empty() {
        return problem_details::bad_request("message is required").into_response();
    }

    match state.sessions.send_message(&req.session_id, &req.message).await {
        Ok(reply) => (
            [
                (header::CONTENT_TYPE, STREAM_CONTENT_TYPE),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(reply),
        )
            .into_response(),
        Err(e) => session_error(e),
    }
}

/// GET /api/chat-history/{session_id}
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.sessions.get_history(&session_id).await {
        Ok(messages) => Json(HistoryResponse {
            success: true,
            data: messages,
        })
        .into_response(),
        Err(e) => session_error(e),
    }
}
