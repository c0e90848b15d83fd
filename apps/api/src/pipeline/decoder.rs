//! Result Decoder: syntactic parsing of raw model text into a task's decoded shape.
//!
//! Field presence and typing are not checked here; that is the normalizer's job.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::llm_client::{RawModelOutput, ResponseMode};
use crate::pipeline::{PipelineError, TaskKind};

/// Decodes raw model output. Structured output must parse as a JSON object
/// matching `D`; text output is handed over verbatim.
pub fn decode<D: DeserializeOwned>(task: TaskKind, raw: &RawModelOutput) -> Result<D, PipelineError> {
    let parsed = match raw.mode {
        ResponseMode::Structured => serde_json::from_str(strip_json_fences(&raw.text)),
        ResponseMode::Text => serde_json::from_value(Value::String(raw.text.clone())),
    };

    parsed.map_err(|source| {
        error!("Failed to decode {task} output: {source}. Raw response: {}", raw.text);
        PipelineError::MalformedModelOutput {
            task,
            raw: raw.text.clone(),
            source,
        }
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Map};

    #[derive(Debug, Deserialize)]
    struct Loose {
        score: Option<Value>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    }

    fn structured(text: &str) -> RawModelOutput {
        RawModelOutput {
            text: text.to_string(),
            mode: ResponseMode::Structured,
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_decode_keeps_values_uncoerced() {
        let decoded: Loose = decode(
            TaskKind::CommunicationAnalysis,
            &structured(r#"{"score": "7", "tone": "warm"}"#),
        )
        .unwrap();
        assert_eq!(decoded.score, Some(json!("7")));
        assert_eq!(decoded.extra.get("tone"), Some(&json!("warm")));
    }

    #[test]
    fn test_invalid_json_is_malformed_and_keeps_raw_text() {
        let err = decode::<Loose>(
            TaskKind::AnalyticsGeneration,
            &structured("Sure! Here is the analysis: {overallScore: 80"),
        )
        .unwrap_err();

        match err {
            PipelineError::MalformedModelOutput { task, raw, .. } => {
                assert_eq!(task, TaskKind::AnalyticsGeneration);
                assert!(raw.starts_with("Sure!"));
            }
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn test_non_object_document_is_malformed() {
        let err = decode::<Loose>(TaskKind::InsightGeneration, &structured("[1, 2, 3]")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedModelOutput { .. }));
    }

    #[test]
    fn test_text_mode_passes_through_verbatim() {
        let raw = RawModelOutput {
            text: "  plain words, not JSON  ".to_string(),
            mode: ResponseMode::Text,
        };
        let decoded: String = decode(TaskKind::CommunicationAnalysis, &raw).unwrap();
        assert_eq!(decoded, "  plain words, not JSON  ");
    }
}
