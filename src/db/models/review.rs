//! Review models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-review lifecycle, independent of the paper's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    InProgress,
    Submitted,
    Completed,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "SUBMITTED" => Ok(Self::Submitted),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(format!("Unknown review status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub paper_id: String,
    pub reviewer_id: String,
    pub status: String,
    pub comments: Option<String>,
    // Rating scales are advisory; no range is enforced here
    pub overall_rating: Option<i64>,
    pub technical_quality_rating: Option<i64>,
    pub clarity_rating: Option<i64>,
    pub originality_rating: Option<i64>,
    pub significance_rating: Option<i64>,
    pub submitted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Review {
    pub fn status_enum(&self) -> Option<ReviewStatus> {
        self.status.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub paper_id: String,
    pub comments: Option<String>,
    pub overall_rating: Option<i64>,
    pub technical_quality_rating: Option<i64>,
    pub clarity_rating: Option<i64>,
    pub originality_rating: Option<i64>,
    pub significance_rating: Option<i64>,
}
