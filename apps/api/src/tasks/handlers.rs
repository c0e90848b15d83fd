//! Axum route handlers for the generation tasks.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::InterviewStore;
use crate::tasks::analytics::{
    generate_interview_analytics, AnalyticsOutcome, AnalyticsPayload, AnalyticsRequest,
    InterviewAnalytics,
};
use crate::tasks::communication::{analyze_communication, CommunicationAnalysis};
use crate::tasks::insights::{generate_insights, InterviewInsights};
use crate::tasks::questions::{generate_questions, GeneratedQuestions, QuestionsInput};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightsRequest {
    pub interview_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommunicationRequest {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub response: GeneratedQuestions,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub response: InterviewInsights,
}

#[derive(Debug, Serialize)]
pub struct CommunicationResponse {
    pub analysis: CommunicationAnalysis,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-interview-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    payload: Result<Json<QuestionsInput>, JsonRejection>,
) -> Result<Json<QuestionsResponse>, AppError> {
    info!("generate-interview-questions request received");
    let Json(input) = payload?;

    let response = generate_questions(state.model.as_ref(), &input)
        .await
        .map_err(|e| {
            AppError::from_pipeline(
                e,
                "Failed to generate interview questions",
                state.config.expose_error_details(),
            )
        })?;

    Ok(Json(QuestionsResponse { response }))
}

/// POST /api/generate-insights
///
/// Generates insights across all responses and stores them on the interview.
pub async fn handle_generate_insights(
    State(state): State<AppState>,
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<InsightsResponse>, AppError> {
    info!("generate-insights request received");
    let Json(request) = payload?;
    if request.interview_id.trim().is_empty() {
        return Err(AppError::Validation("interviewId is required".to_string()));
    }

    let response = generate_insights(
        state.store.as_ref(),
        state.model.as_ref(),
        &request.interview_id,
    )
    .await
    .map_err(|e| {
        AppError::from_pipeline(
            e,
            "internal server error",
            state.config.expose_error_details(),
        )
    })?;

    Ok(Json(InsightsResponse { response }))
}

/// POST /api/analyze-communication
pub async fn handle_analyze_communication(
    State(state): State<AppState>,
    payload: Result<Json<CommunicationRequest>, JsonRejection>,
) -> Result<Json<CommunicationResponse>, AppError> {
    info!("analyze-communication request received");
    let Json(request) = payload?;

    let analysis = analyze_communication(state.model.as_ref(), &request.transcript)
        .await
        .map_err(|e| {
            AppError::from_pipeline(
                e,
                "Internal server error",
                state.config.expose_error_details(),
            )
        })?;

    Ok(Json(CommunicationResponse { analysis }))
}

/// POST /api/generate-analytics
///
/// Responds with the outcome's own status: 200 with analytics, or 500 with
/// zero-score analytics when generation failed.
pub async fn handle_generate_analytics(
    State(state): State<AppState>,
    payload: Result<Json<AnalyticsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyticsOutcome>), AppError> {
    info!("generate-analytics request received");
    let Json(request) = payload?;
    if request.call_id.trim().is_empty() {
        return Err(AppError::Validation("callId is required".to_string()));
    }
    if request.interview_id.trim().is_empty() {
        return Err(AppError::Validation("interviewId is required".to_string()));
    }

    let outcome =
        generate_interview_analytics(state.store.as_ref(), state.model.as_ref(), &request).await;

    if outcome.is_fresh() {
        if let AnalyticsPayload::Generated(analytics) = &outcome.analytics {
            store_analytics(state.store.as_ref(), &request.call_id, analytics).await;
        }
    }

    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok((status, Json(outcome)))
}

/// Saves fresh analytics so the next request for the call is served from the store.
/// A failed save is logged; the caller still gets the analytics.
async fn store_analytics(store: &dyn InterviewStore, call_id: &str, analytics: &InterviewAnalytics) {
    let value = match serde_json::to_value(analytics) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not serialize analytics for call {call_id}: {e}");
            return;
        }
    };

    if let Err(e) = store.update_response_analytics(call_id, &value).await {
        warn!("Could not store analytics for call {call_id}: {e}");
    }
}
