//! Paper models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Editorial lifecycle of a paper.
///
/// Transitions are not restricted: any status can be set from any other.
/// ACCEPTED, REJECTED, and PUBLISHED additionally stamp their timestamp
/// on the paper when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaperStatus {
    Submitted,
    UnderReview,
    RevisionRequested,
    Accepted,
    Rejected,
    Published,
    Archived,
}

impl std::fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::UnderReview => write!(f, "UNDER_REVIEW"),
            Self::RevisionRequested => write!(f, "REVISION_REQUESTED"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Published => write!(f, "PUBLISHED"),
            Self::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl std::str::FromStr for PaperStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUBMITTED" => Ok(Self::Submitted),
            "UNDER_REVIEW" => Ok(Self::UnderReview),
            "REVISION_REQUESTED" => Ok(Self::RevisionRequested),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "PUBLISHED" => Ok(Self::Published),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(format!("Unknown paper status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub abstract_text: String,
    pub content: String,
    pub author_id: String,
    pub status: String,
    /// Similarity percentage, only meaningful once plagiarism_checked is set
    pub plagiarism_score: Option<f64>,
    pub plagiarism_checked: bool,
    pub submitted_at: String,
    pub accepted_at: Option<String>,
    pub rejected_at: Option<String>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Paper {
    pub fn status_enum(&self) -> Option<PaperStatus> {
        self.status.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaperRequest {
    pub title: String,
    pub abstract_text: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            PaperStatus::Submitted,
            PaperStatus::UnderReview,
            PaperStatus::RevisionRequested,
            PaperStatus::Accepted,
            PaperStatus::Rejected,
            PaperStatus::Published,
            PaperStatus::Archived,
        ] {
            assert_eq!(status.to_string().parse::<PaperStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!("under_review".parse::<PaperStatus>(), Ok(PaperStatus::UnderReview));
        assert_eq!("Accepted".parse::<PaperStatus>(), Ok(PaperStatus::Accepted));
        assert!("IN_LIMBO".parse::<PaperStatus>().is_err());
    }
}
