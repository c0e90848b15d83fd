//! Generation pipeline: prompt build → model invoke → decode → normalize.
//!
//! Every task kind plugs into the same sequence through the `Task` trait.
//! Nothing here holds state between calls; each `run` is one independent
//! round trip to the model.

use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::llm_client::{LlmError, ModelInvoker, ResponseMode};
use crate::store::StoreError;

pub mod decoder;
pub mod normalize;

/// The four generation purposes the pipeline serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    QuestionGeneration,
    InsightGeneration,
    AnalyticsGeneration,
    CommunicationAnalysis,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::QuestionGeneration => "question_generation",
            TaskKind::InsightGeneration => "insight_generation",
            TaskKind::AnalyticsGeneration => "analytics_generation",
            TaskKind::CommunicationAnalysis => "communication_analysis",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System and user prompt for a single call. Built fresh per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Fills `{key}` placeholders in one left-to-right pass. Substituted values
/// are never rescanned, so caller text containing a placeholder stays verbatim.
/// Braces that do not name a known key are copied through.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find(|(key, _)| {
            tail[1..]
                .strip_prefix(*key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model unavailable: {message}")]
    ModelUnavailable { message: String, status: Option<u16> },

    #[error("Model refused the request: {reason}")]
    ModelRefused { reason: String },

    #[error("Malformed {task} output: {source}")]
    MalformedModelOutput {
        task: TaskKind,
        raw: String,
        source: serde_json::Error,
    },

    #[error("Data layer error: {0}")]
    Store(#[from] StoreError),
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Blocked { reason } => PipelineError::ModelRefused { reason },
            other => PipelineError::ModelUnavailable {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// A task kind's prompt shape, result shapes and normalization rules.
pub trait Task {
    const KIND: TaskKind;
    const MODE: ResponseMode = ResponseMode::Structured;

    type Input: Sync + ?Sized;
    /// Loosely-typed model output; no coercion happens while decoding.
    type Decoded: DeserializeOwned + Send;
    /// Caller-supplied data the normalizer may merge in.
    type Context: Sync + ?Sized;
    type Output: Send;

    /// Fails with `InvalidInput` before any model call when mandatory data is missing.
    fn build_prompt(input: &Self::Input) -> Result<PromptPair, PipelineError>;

    /// Total: must produce a usable result from any decoded value.
    fn normalize(decoded: Self::Decoded, context: &Self::Context) -> Self::Output;
}

/// Runs one task through build → invoke → decode → normalize.
pub async fn run<T: Task>(
    model: &dyn ModelInvoker,
    input: &T::Input,
    context: &T::Context,
) -> Result<T::Output, PipelineError> {
    let prompt = T::build_prompt(input)?;

    info!("Invoking model for {}", T::KIND);
    let raw = model
        .invoke(&prompt.system_prompt, &prompt.user_prompt, T::MODE)
        .await
        .map_err(|e| {
            error!(
                "Model call for {} failed (status {:?}): {e}",
                T::KIND,
                e.status()
            );
            PipelineError::from(e)
        })?;
    debug!("Raw {} output: {}", T::KIND, raw.text);

    let decoded: T::Decoded = decoder::decode(T::KIND, &raw)?;
    Ok(T::normalize(decoded, context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_leaves_substituted_text_alone() {
        let filled = fill_template(
            "Q: {questions}\nT: {transcript}",
            &[("questions", "Explain {transcript} tokens"), ("transcript", "hello")],
        );
        assert_eq!(filled, "Q: Explain {transcript} tokens\nT: hello");
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let filled = fill_template(r#"Return {"score": {n}} and {other}"#, &[("n", "5")]);
        assert_eq!(filled, r#"Return {"score": 5} and {other}"#);
    }

    #[test]
    fn test_blocked_maps_to_refused() {
        let err = PipelineError::from(LlmError::Blocked {
            reason: "SAFETY".to_string(),
        });
        assert!(matches!(err, PipelineError::ModelRefused { reason } if reason == "SAFETY"));
    }

    #[test]
    fn test_api_error_maps_to_unavailable_with_status() {
        let err = PipelineError::from(LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        });
        match err {
            PipelineError::ModelUnavailable { message, status } => {
                assert_eq!(status, Some(429));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn test_empty_content_maps_to_unavailable() {
        let err = PipelineError::from(LlmError::EmptyContent);
        assert!(matches!(
            err,
            PipelineError::ModelUnavailable { status: None, .. }
        ));
    }

    #[test]
    fn test_task_kind_labels() {
        assert_eq!(TaskKind::AnalyticsGeneration.to_string(), "analytics_generation");
        assert_eq!(TaskKind::QuestionGeneration.as_str(), "question_generation");
    }
}
