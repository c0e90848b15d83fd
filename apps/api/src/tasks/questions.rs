//! Interview question generation from an interviewer's configuration.
//!
//! Results are returned as decoded. Malformed question entries (missing
//! `type`, non-string `question`) reach the caller unchanged; persisting and
//! validating the chosen questions is the interview editor's job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::ModelInvoker;
use crate::pipeline::{self, fill_template, PipelineError, PromptPair, Task, TaskKind};
use crate::tasks::prompts::{QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM};

const DEFAULT_QUESTION_MIX: &str = "a balanced mix of behavioral, technical and situational";

/// Interview configuration posted by the interview editor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionsInput {
    pub name: String,
    pub objective: String,
    /// Desired question count.
    pub number: u32,
    #[serde(alias = "context")]
    pub description: Option<String>,
    pub question_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct QuestionGeneration;

impl Task for QuestionGeneration {
    const KIND: TaskKind = TaskKind::QuestionGeneration;

    type Input = QuestionsInput;
    type Decoded = GeneratedQuestions;
    type Context = ();
    type Output = GeneratedQuestions;

    fn build_prompt(input: &QuestionsInput) -> Result<PromptPair, PipelineError> {
        if input.name.trim().is_empty() {
            return Err(PipelineError::InvalidInput("name is required".to_string()));
        }
        if input.objective.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "objective is required".to_string(),
            ));
        }
        if input.number == 0 {
            return Err(PipelineError::InvalidInput(
                "number must be at least 1".to_string(),
            ));
        }

        let question_types = if input.question_types.is_empty() {
            DEFAULT_QUESTION_MIX.to_string()
        } else {
            input.question_types.join(", ")
        };
        let number = input.number.to_string();
        let description = input
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("None provided.");

        Ok(PromptPair {
            system_prompt: format!("{QUESTIONS_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}"),
            user_prompt: fill_template(
                QUESTIONS_PROMPT_TEMPLATE,
                &[
                    ("number", number.as_str()),
                    ("question_types", question_types.as_str()),
                    ("name", input.name.as_str()),
                    ("objective", input.objective.as_str()),
                    ("description", description),
                ],
            ),
        })
    }

    fn normalize(decoded: GeneratedQuestions, _context: &()) -> GeneratedQuestions {
        decoded
    }
}

pub async fn generate_questions(
    model: &dyn ModelInvoker,
    input: &QuestionsInput,
) -> Result<GeneratedQuestions, PipelineError> {
    let result = pipeline::run::<QuestionGeneration>(model, input, &()).await?;
    info!("Interview questions generated for '{}'", input.name);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use serde_json::json;

    fn input() -> QuestionsInput {
        QuestionsInput {
            name: "Staff Backend Engineer".to_string(),
            objective: "Evaluate distributed systems design".to_string(),
            number: 3,
            description: Some("Focus on storage engines".to_string()),
            question_types: vec!["technical".to_string(), "behavioral".to_string()],
        }
    }

    #[test]
    fn test_request_accepts_context_alias_and_missing_fields() {
        let input: QuestionsInput = serde_json::from_value(json!({
            "name": "Screen",
            "objective": "Hire",
            "number": 5,
            "context": "Remote role"
        }))
        .unwrap();
        assert_eq!(input.description.as_deref(), Some("Remote role"));
        assert!(input.question_types.is_empty());

        let empty: QuestionsInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.number, 0);
    }

    #[test]
    fn test_prompt_embeds_configuration() {
        let prompt = QuestionGeneration::build_prompt(&input()).unwrap();
        assert!(prompt.user_prompt.contains("Staff Backend Engineer"));
        assert!(prompt.user_prompt.contains("Number of questions to generate: 3"));
        assert!(prompt.user_prompt.contains("technical, behavioral"));
        assert!(prompt.user_prompt.contains("Focus on storage engines"));
        assert!(prompt.system_prompt.contains("valid JSON only"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            QuestionGeneration::build_prompt(&input()).unwrap(),
            QuestionGeneration::build_prompt(&input()).unwrap()
        );
    }

    #[test]
    fn test_prompt_rejects_missing_objective_or_count() {
        let no_objective = QuestionsInput {
            objective: " ".to_string(),
            ..input()
        };
        assert!(matches!(
            QuestionGeneration::build_prompt(&no_objective),
            Err(PipelineError::InvalidInput(_))
        ));

        let no_count = QuestionsInput { number: 0, ..input() };
        assert!(matches!(
            QuestionGeneration::build_prompt(&no_count),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_entries_are_surfaced_unchanged() {
        let body = json!({
            "questions": [
                {"question": "Walk me through an LSM tree.", "type": "technical"},
                {"question": 42}
            ],
            "description": "A deep-dive on storage."
        });
        let model = ScriptedModel::replying(&body.to_string());

        let result = generate_questions(&model, &input()).await.unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[tokio::test]
    async fn test_invalid_input_skips_model_call() {
        let model = ScriptedModel::default();
        let err = generate_questions(&model, &QuestionsInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(model.calls(), 0);
    }
}
