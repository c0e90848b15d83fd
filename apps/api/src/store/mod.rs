//! Data layer seam for interviews and call responses.
//!
//! The pipeline only needs read-through lookups and single-field updates, so
//! the store is a trait; `AppState` carries an `Arc<dyn InterviewStore>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod postgres;

pub use postgres::PgInterviewStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One main interview question as configured by the interviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewRecord {
    pub id: String,
    pub name: String,
    pub objective: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysis {
    #[serde(default)]
    pub call_summary: Option<String>,
}

/// Call details captured by the voice provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallDetails {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub call_analysis: Option<CallAnalysis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub call_id: String,
    pub interview_id: String,
    /// Previously computed analytics, stored as produced.
    pub analytics: Option<Value>,
    pub details: Option<CallDetails>,
}

impl ResponseRecord {
    pub fn call_summary(&self) -> Option<&str> {
        self.details
            .as_ref()?
            .call_analysis
            .as_ref()?
            .call_summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn get_response_by_call_id(&self, call_id: &str) -> Result<ResponseRecord, StoreError>;

    async fn list_responses(&self, interview_id: &str) -> Result<Vec<ResponseRecord>, StoreError>;

    async fn get_interview_by_id(&self, id: &str) -> Result<InterviewRecord, StoreError>;

    async fn update_interview_insights(&self, id: &str, insights: &[Value]) -> Result<(), StoreError>;

    async fn update_response_analytics(&self, call_id: &str, analytics: &Value) -> Result<(), StoreError>;
}
