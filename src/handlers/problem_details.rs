//! RFC 7807 problem details responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const CONTENT_TYPE: &str = "application/problem+json";

#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    pub title: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    fn new(status: StatusCode, problem_type: &'static str, detail: Option<String>) -> Self {
        Self {
            problem_type,
            title: status.canonical_reason().unwrap_or("Error"),
            status: status.as_u16(),
            detail,
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, CONTENT_TYPE)], Json(self)).into_response()
    }
}

pub fn bad_request(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::BAD_REQUEST, "urn:problem:bad-request", Some(detail.into()))
}

pub fn not_found(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::NOT_FOUND, "urn:problem:not-found", Some(detail.into()))
}

pub fn bad_gateway(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::BAD_GATEWAY, "urn:problem:upstream", Some(detail.into()))
}

pub fn internal_error(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "urn:problem:internal",
        Some(detail.into()),
    )
}

/// Malformed or incomplete JSON bodies are client errors, whatever axum's default status.
pub fn from_json_rejection(rejection: JsonRejection) -> ProblemDetails {
    bad_request(rejection.body_text())
}
