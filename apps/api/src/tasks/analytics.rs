//! Per-response analytics: scoring, per-question summaries, communication and
//! soft-skill feedback for one interview call.
//!
//! This task never fails towards its caller: stored analytics are returned
//! without a model call, and any pipeline failure degrades to a zero-score
//! result with status 500.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, TRANSCRIPT_GROUNDING};
use crate::llm_client::ModelInvoker;
use crate::pipeline::normalize::{array_or_empty, coerce_number, text_or};
use crate::pipeline::{self, fill_template, PipelineError, PromptPair, Task, TaskKind};
use crate::store::InterviewStore;
use crate::tasks::prompts::{ANALYTICS_PROMPT_TEMPLATE, ANALYTICS_SYSTEM};

pub const NO_COMMUNICATION_FEEDBACK: &str = "No communication feedback available";
pub const NO_SOFT_SKILL_SUMMARY: &str = "No soft skill summary available";

pub const FAILED_OVERALL_FEEDBACK: &str = "Error generating analytics";
pub const FAILED_COMMUNICATION_FEEDBACK: &str = "Error generating communication analysis";
pub const FAILED_SOFT_SKILL_SUMMARY: &str = "Error generating soft skills summary";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AnalyticsInput {
    pub transcript: String,
    /// Main interview questions, in interview order.
    pub questions: Vec<String>,
}

/// Analytics exactly as the model produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedAnalytics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_feedback: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_summaries: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_skill_summary: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_interview_questions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunicationScore {
    pub score: f64,
    pub feedback: String,
}

/// Normalized analytics handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewAnalytics {
    pub overall_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_feedback: Option<Value>,
    pub communication: CommunicationScore,
    pub question_summaries: Vec<Value>,
    pub soft_skill_summary: String,
    pub main_interview_questions: Vec<String>,
    /// Any other fields the model returned, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InterviewAnalytics {
    /// Zero-score result substituted when generation fails.
    pub fn failed() -> Self {
        InterviewAnalytics {
            overall_score: 0.0,
            overall_feedback: Some(Value::String(FAILED_OVERALL_FEEDBACK.to_string())),
            communication: CommunicationScore {
                score: 0.0,
                feedback: FAILED_COMMUNICATION_FEEDBACK.to_string(),
            },
            question_summaries: Vec::new(),
            soft_skill_summary: FAILED_SOFT_SKILL_SUMMARY.to_string(),
            main_interview_questions: Vec::new(),
            extra: Map::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Task definition
// ────────────────────────────────────────────────────────────────────────────

pub struct AnalyticsGeneration;

impl Task for AnalyticsGeneration {
    const KIND: TaskKind = TaskKind::AnalyticsGeneration;

    type Input = AnalyticsInput;
    type Decoded = DecodedAnalytics;
    type Context = [String];
    type Output = InterviewAnalytics;

    fn build_prompt(input: &AnalyticsInput) -> Result<PromptPair, PipelineError> {
        if input.transcript.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "A transcript is required to generate analytics".to_string(),
            ));
        }
        if input.questions.is_empty() {
            return Err(PipelineError::InvalidInput(
                "The interview has no main questions to evaluate against".to_string(),
            ));
        }

        let main_questions = input
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {q}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(PromptPair {
            system_prompt: format!(
                "{ANALYTICS_SYSTEM}\n\n{TRANSCRIPT_GROUNDING}\n\n{JSON_ONLY_INSTRUCTION}"
            ),
            user_prompt: fill_template(
                ANALYTICS_PROMPT_TEMPLATE,
                &[
                    ("main_questions", main_questions.as_str()),
                    ("transcript", input.transcript.as_str()),
                ],
            ),
        })
    }

    /// Coerces scores, fills placeholders and overwrites the question list with
    /// the caller's own questions. The model's restatement is never kept.
    fn normalize(decoded: DecodedAnalytics, questions: &[String]) -> InterviewAnalytics {
        let communication = decoded.communication.as_ref();

        InterviewAnalytics {
            overall_score: coerce_number(decoded.overall_score.as_ref()),
            overall_feedback: decoded.overall_feedback,
            communication: CommunicationScore {
                score: coerce_number(communication.and_then(|c| c.get("score"))),
                feedback: text_or(
                    communication.and_then(|c| c.get("feedback")),
                    NO_COMMUNICATION_FEEDBACK,
                ),
            },
            question_summaries: array_or_empty(decoded.question_summaries),
            soft_skill_summary: text_or(decoded.soft_skill_summary.as_ref(), NO_SOFT_SKILL_SUMMARY),
            main_interview_questions: questions.to_vec(),
            extra: decoded.extra,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsRequest {
    pub call_id: String,
    pub interview_id: String,
    /// Overrides the transcript stored with the call when non-empty.
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalyticsPayload {
    /// Previously computed analytics, returned as stored.
    Stored(Value),
    Generated(InterviewAnalytics),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsOutcome {
    pub analytics: AnalyticsPayload,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl AnalyticsOutcome {
    fn ok(analytics: AnalyticsPayload) -> Self {
        Self {
            analytics,
            status: 200,
            error: None,
        }
    }

    fn failed() -> Self {
        Self {
            analytics: AnalyticsPayload::Generated(InterviewAnalytics::failed()),
            status: 500,
            error: Some("internal server error"),
        }
    }

    /// True when fresh analytics were produced by the model on this call.
    pub fn is_fresh(&self) -> bool {
        self.status == 200 && matches!(self.analytics, AnalyticsPayload::Generated(_))
    }
}

/// Returns stored analytics for the call when present, otherwise generates them.
/// Never returns an error: failures become a zero-score outcome with status 500.
pub async fn generate_interview_analytics(
    store: &dyn InterviewStore,
    model: &dyn ModelInvoker,
    request: &AnalyticsRequest,
) -> AnalyticsOutcome {
    match try_generate(store, model, request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Analytics generation for call {} failed: {e}", request.call_id);
            AnalyticsOutcome::failed()
        }
    }
}

async fn try_generate(
    store: &dyn InterviewStore,
    model: &dyn ModelInvoker,
    request: &AnalyticsRequest,
) -> Result<AnalyticsOutcome, PipelineError> {
    let response = store.get_response_by_call_id(&request.call_id).await?;

    if let Some(analytics) = response.analytics {
        info!("Returning stored analytics for call {}", request.call_id);
        return Ok(AnalyticsOutcome::ok(AnalyticsPayload::Stored(analytics)));
    }

    let interview = store.get_interview_by_id(&request.interview_id).await?;

    let transcript = request
        .transcript
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| response.details.and_then(|d| d.transcript))
        .unwrap_or_default();

    let input = AnalyticsInput {
        transcript,
        questions: interview.questions.into_iter().map(|q| q.question).collect(),
    };

    let analytics = pipeline::run::<AnalyticsGeneration>(model, &input, &input.questions).await?;
    info!(
        "Generated analytics for call {}: overall_score={}",
        request.call_id, analytics.overall_score
    );

    Ok(AnalyticsOutcome::ok(AnalyticsPayload::Generated(analytics)))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
