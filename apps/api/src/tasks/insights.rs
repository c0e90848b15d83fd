//! Interview-wide insights distilled from every call summary of an interview.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::ModelInvoker;
use crate::pipeline::normalize::array_or_empty;
use crate::pipeline::{self, fill_template, PipelineError, PromptPair, Task, TaskKind};
use crate::store::InterviewStore;
use crate::tasks::prompts::{INSIGHTS_PROMPT_TEMPLATE, INSIGHTS_SYSTEM};

#[derive(Debug, Clone)]
pub struct InsightsInput {
    /// Call summaries of every response, one per line.
    pub call_summaries: String,
    pub interview_name: String,
    pub objective: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewInsights {
    pub insights: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct InsightGeneration;

impl Task for InsightGeneration {
    const KIND: TaskKind = TaskKind::InsightGeneration;

    type Input = InsightsInput;
    type Decoded = DecodedInsights;
    type Context = ();
    type Output = InterviewInsights;

    fn build_prompt(input: &InsightsInput) -> Result<PromptPair, PipelineError> {
        if input.interview_name.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "The interview has no name".to_string(),
            ));
        }
        if input.objective.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "The interview has no objective".to_string(),
            ));
        }
        if input.call_summaries.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "No call summaries are available for this interview yet".to_string(),
            ));
        }

        Ok(PromptPair {
            system_prompt: format!("{INSIGHTS_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}"),
            user_prompt: fill_template(
                INSIGHTS_PROMPT_TEMPLATE,
                &[
                    ("name", input.interview_name.as_str()),
                    ("objective", input.objective.as_str()),
                    ("description", input.description.as_str()),
                    ("call_summaries", input.call_summaries.as_str()),
                ],
            ),
        })
    }

    fn normalize(decoded: DecodedInsights, _context: &()) -> InterviewInsights {
        InterviewInsights {
            insights: array_or_empty(decoded.insights),
            extra: decoded.extra,
        }
    }
}

/// Generates insights for an interview and stores them on the interview record.
pub async fn generate_insights(
    store: &dyn InterviewStore,
    model: &dyn ModelInvoker,
    interview_id: &str,
) -> Result<InterviewInsights, PipelineError> {
    let responses = store.list_responses(interview_id).await?;
    let interview = store.get_interview_by_id(interview_id).await?;

    let call_summaries = responses
        .iter()
        .filter_map(|r| r.call_summary())
        .collect::<Vec<_>>()
        .join("\n");

    let input = InsightsInput {
        call_summaries,
        interview_name: interview.name,
        objective: interview.objective,
        description: interview.description.unwrap_or_default(),
    };

    let result = pipeline::run::<InsightGeneration>(model, &input, &()).await?;

    store
        .update_interview_insights(interview_id, &result.insights)
        .await?;
    info!(
        "Stored {} insights for interview {interview_id}",
        result.insights.len()
    );

    Ok(result)
}
