//! Communication skill analysis of a single transcript.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, TRANSCRIPT_GROUNDING};
use crate::llm_client::ModelInvoker;
use crate::pipeline::{self, fill_template, PipelineError, PromptPair, Task, TaskKind};
use crate::tasks::prompts::{COMMUNICATION_PROMPT_TEMPLATE, COMMUNICATION_SYSTEM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub areas: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct CommunicationAnalysisTask;

impl Task for CommunicationAnalysisTask {
    const KIND: TaskKind = TaskKind::CommunicationAnalysis;

    type Input = str;
    type Decoded = CommunicationAnalysis;
    type Context = ();
    type Output = CommunicationAnalysis;

    fn build_prompt(transcript: &str) -> Result<PromptPair, PipelineError> {
        if transcript.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "Transcript is required".to_string(),
            ));
        }

        Ok(PromptPair {
            system_prompt: format!(
                "{COMMUNICATION_SYSTEM}\n\n{TRANSCRIPT_GROUNDING}\n\n{JSON_ONLY_INSTRUCTION}"
            ),
            user_prompt: fill_template(COMMUNICATION_PROMPT_TEMPLATE, &[("transcript", transcript)]),
        })
    }

    fn normalize(decoded: CommunicationAnalysis, _context: &()) -> CommunicationAnalysis {
        decoded
    }
}

pub async fn analyze_communication(
    model: &dyn ModelInvoker,
    transcript: &str,
) -> Result<CommunicationAnalysis, PipelineError> {
    let analysis = pipeline::run::<CommunicationAnalysisTask>(model, transcript, &()).await?;
    info!("Communication analysis completed");
    Ok(analysis)
}
