use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::build_info::BuildInfo;
use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[derive(Serialize)]
pub struct ReadyzResponse {
    pub status: &'static str,
    pub cached_responses: usize,
}

pub async fn readyz(State(state): State<AppState>) -> Json<ReadyzResponse> {
    Json(ReadyzResponse {
        status: "ok",
        cached_responses: state.analysis.cache().len(),
    })
}

pub async fn version() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

pub async fn welcome() -> &'static str {
    "Welcome to the Health Connect API"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_livez() {
        let (status, body) = livez().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_version() {
        let Json(info) = version().await;
        assert_eq!(info.service, "health-connect");
    }
}
