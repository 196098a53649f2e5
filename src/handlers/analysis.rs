//! Single-shot analysis HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::analysis::{
    AdvancedHealthRequest, AnalysisError, AnalysisRequest, HealthInsightsRequest, WellnessRequest,
};
use crate::api::AnalysisResponse;
use crate::handlers::problem_details;
use crate::server::AppState;

async fn run<R>(state: AppState, body: Result<Json<R>, JsonRejection>) -> Response
where
    R: AnalysisRequest + DeserializeOwned,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return problem_details::from_json_rejection(rejection).into_response(),
    };

    match state.analysis.analyze(&request).await {
        Ok(analysis) => {
            let message = if analysis.cached {
                R::CACHED_MESSAGE
            } else {
                R::GENERATED_MESSAGE
            };
            Json(AnalysisResponse {
                success: true,
                data: analysis.data,
                message: message.to_string(),
                cached: analysis.cached,
            })
            .into_response()
        }
        Err(AnalysisError::Validation(detail)) => {
            problem_details::bad_request(detail).into_response()
        }
        Err(AnalysisError::Upstream(e)) => {
            error!(scope = R::SCOPE, error = %e, "Model request failed");
            problem_details::bad_gateway(format!("model request failed: {e}")).into_response()
        }
        Err(AnalysisError::Internal(detail)) => {
            error!(scope = R::SCOPE, error = %detail, "Analysis failed");
            problem_details::internal_error(detail).into_response()
        }
    }
}

/// POST /api/health-insights
pub async fn health_insights(
    State(state): State<AppState>,
    body: Result<Json<HealthInsightsRequest>, JsonRejection>,
) -> Response {
    run(state, body).await
}

/// POST /api/advanced-health-analysis
pub async fn advanced_health_analysis(
    State(state): State<AppState>,
    body: Result<Json<AdvancedHealthRequest>, JsonRejection>,
) -> Response {
    run(state, body).await
}

/// POST /api/analyze-wellness
pub async fn analyze_wellness(
    State(state): State<AppState>,
    body: Result<Json<WellnessRequest>, JsonRejection>,
) -> Response {
    run(state, body).await
}
