use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::store::{
    CallDetails, InterviewRecord, InterviewStore, Question, ResponseRecord, StoreError,
};

#[derive(Debug, FromRow)]
struct InterviewRow {
    id: String,
    name: String,
    objective: String,
    description: Option<String>,
    questions: Option<Json<Vec<Question>>>,
}

impl From<InterviewRow> for InterviewRecord {
    fn from(row: InterviewRow) -> Self {
        InterviewRecord {
            id: row.id,
            name: row.name,
            objective: row.objective,
            description: row.description,
            questions: row.questions.map(|q| q.0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, FromRow)]
struct ResponseRow {
    call_id: String,
    interview_id: String,
    analytics: Option<Value>,
    details: Option<Json<CallDetails>>,
}

impl From<ResponseRow> for ResponseRecord {
    fn from(row: ResponseRow) -> Self {
        ResponseRecord {
            call_id: row.call_id,
            interview_id: row.interview_id,
            // A JSON null in the column means "not computed yet".
            analytics: row.analytics.filter(|v| !v.is_null()),
            details: row.details.map(|d| d.0),
        }
    }
}

/// Postgres-backed store over the `interview` and `response` tables.
#[derive(Clone)]
pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    /// Opens a pool of at most 10 connections.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn get_response_by_call_id(&self, call_id: &str) -> Result<ResponseRecord, StoreError> {
        sqlx::query_as::<_, ResponseRow>(
            "SELECT call_id, interview_id, analytics, details FROM response WHERE call_id = $1",
        )
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await?
        .map(ResponseRecord::from)
        .ok_or_else(|| StoreError::NotFound(format!("Response for call {call_id}")))
    }

    async fn list_responses(&self, interview_id: &str) -> Result<Vec<ResponseRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT call_id, interview_id, analytics, details
            FROM response
            WHERE interview_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResponseRecord::from).collect())
    }

    async fn get_interview_by_id(&self, id: &str) -> Result<InterviewRecord, StoreError> {
        sqlx::query_as::<_, InterviewRow>(
            "SELECT id, name, objective, description, questions FROM interview WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(InterviewRecord::from)
        .ok_or_else(|| StoreError::NotFound(format!("Interview {id}")))
    }

    async fn update_interview_insights(&self, id: &str, insights: &[Value]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE interview SET insights = $1 WHERE id = $2")
            .bind(Json(insights))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Interview {id}")));
        }
        Ok(())
    }

    async fn update_response_analytics(&self, call_id: &str, analytics: &Value) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE response SET analytics = $1 WHERE call_id = $2")
            .bind(analytics)
            .bind(call_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Response for call {call_id}")));
        }
        Ok(())
    }
}
