//! Revision models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub paper_id: String,
    /// 1-based, dense per paper; assigned server-side on submission
    pub revision_number: i64,
    pub content: String,
    pub changes_summary: Option<String>,
    pub submitted_at: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRevisionRequest {
    pub paper_id: String,
    pub content: String,
    pub changes_summary: Option<String>,
}
