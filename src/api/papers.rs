//! Paper submission and editorial workflow endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Paper, PaperStatus, SubmitPaperRequest, User};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::validate_title;

fn validate_submit_request(req: &SubmitPaperRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_title(&req.title) {
        errors.add("title", &e);
    }
    if req.abstract_text.trim().is_empty() {
        errors.add("abstractText", "Abstract is required");
    }
    if req.content.trim().is_empty() {
        errors.add("content", "Content is required");
    }

    errors.finish()
}

/// Submit a new paper. The author is the authenticated caller.
pub async fn submit_paper(
    State(state): State<Arc<AppState>>,
    author: User,
    Json(req): Json<SubmitPaperRequest>,
) -> Result<(StatusCode, Json<Paper>), ApiError> {
    validate_submit_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO papers (id, title, abstract_text, content, author_id, status,
                            plagiarism_checked, submitted_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.title)
    .bind(&req.abstract_text)
    .bind(&req.content)
    .bind(&author.id)
    .bind(PaperStatus::Submitted.to_string())
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to submit paper: {}", e);
        ApiError::database("Failed to submit paper")
    })?;

    let paper: Paper = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(paper_id = %paper.id, author = %author.email, "Paper submitted");

    Ok((StatusCode::CREATED, Json(paper)))
}

/// Get a paper by id
pub async fn get_paper(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Paper>, ApiError> {
    let paper: Option<Paper> = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let paper = paper.ok_or_else(|| ApiError::not_found("Paper not found"))?;
    Ok(Json(paper))
}

/// List papers submitted by an author
pub async fn list_papers_by_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<String>,
) -> Result<Json<Vec<Paper>>, ApiError> {
    let papers: Vec<Paper> = sqlx::query_as("SELECT * FROM papers WHERE author_id = ?")
        .bind(&author_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(papers))
}

/// List papers currently in a given status
pub async fn list_papers_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Paper>>, ApiError> {
    let status: PaperStatus = status
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid paper status: {}", status)))?;

    let papers: Vec<Paper> = sqlx::query_as("SELECT * FROM papers WHERE status = ?")
        .bind(status.to_string())
        .fetch_all(&state.db)
        .await?;

    Ok(Json(papers))
}

/// List all papers, most recently submitted first
pub async fn list_papers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Paper>>, ApiError> {
    let papers: Vec<Paper> = sqlx::query_as("SELECT * FROM papers ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(papers))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

/// Move a paper to a new status.
///
/// Transitions are unrestricted; ACCEPTED/REJECTED/PUBLISHED stamp their
/// timestamp each time they are set.
pub async fn update_paper_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Paper>, ApiError> {
    let status: PaperStatus = query
        .status
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid paper status: {}", query.status)))?;

    let _existing: Paper = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Paper not found"))?;

    let now = chrono::Utc::now().to_rfc3339();

    let timestamp_column = match status {
        PaperStatus::Accepted => Some("accepted_at"),
        PaperStatus::Rejected => Some("rejected_at"),
        PaperStatus::Published => Some("published_at"),
        _ => None,
    };

    match timestamp_column {
        Some(column) => {
            let sql = format!(
                "UPDATE papers SET status = ?, {} = ?, updated_at = ? WHERE id = ?",
                column
            );
            sqlx::query(&sql)
                .bind(status.to_string())
                .bind(&now)
                .bind(&now)
                .bind(&id)
                .execute(&state.db)
                .await?;
        }
        None => {
            sqlx::query("UPDATE papers SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.to_string())
                .bind(&now)
                .bind(&id)
                .execute(&state.db)
                .await?;
        }
    }

    let paper: Paper = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(paper_id = %id, status = %paper.status, "Paper status updated");

    Ok(Json(paper))
}

#[derive(Debug, Deserialize)]
pub struct PlagiarismQuery {
    pub score: f64,
}

/// Record the plagiarism screening result for a paper
pub async fn set_plagiarism_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<PlagiarismQuery>,
) -> Result<Json<Paper>, ApiError> {
    if let Err(e) = super::validation::validate_plagiarism_score(query.score) {
        return Err(ApiError::validation_field("score", e));
    }

    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        "UPDATE papers SET plagiarism_score = ?, plagiarism_checked = 1, updated_at = ? WHERE id = ?",
    )
    .bind(query.score)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Paper not found"));
    }

    let paper: Paper = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(paper))
}

/// Delete a paper along with its reviews and revisions
pub async fn delete_paper(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Reviews and revisions go with it via ON DELETE CASCADE
    let result = sqlx::query("DELETE FROM papers WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Paper not found"));
    }

    tracing::info!(paper_id = %id, "Paper deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil;

    #[tokio::test]
    async fn test_submit_and_get_paper() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;

        let paper = testutil::submit_paper(&state, &author, "Sketch of the Analytical Engine").await;
        assert_eq!(paper.status, "SUBMITTED");
        assert_eq!(paper.author_id, author.id);
        assert!(!paper.plagiarism_checked);
        assert!(paper.accepted_at.is_none());

        let Json(fetched) = get_paper(State(state.clone()), Path(paper.id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.id, paper.id);

        let missing = get_paper(State(state), Path("missing".to_string())).await;
        assert_eq!(missing.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_accepted_status_stamps_only_accepted_at() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;
        let paper = testutil::submit_paper(&state, &author, "Notes by the Translator").await;

        let Json(updated) = update_paper_status(
            State(state.clone()),
            Path(paper.id.clone()),
            Query(StatusQuery {
                status: "ACCEPTED".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, "ACCEPTED");
        assert!(updated.accepted_at.is_some());
        assert!(updated.rejected_at.is_none());
        assert!(updated.published_at.is_none());

        let bad = update_paper_status(
            State(state),
            Path(paper.id),
            Query(StatusQuery {
                status: "SHREDDED".to_string(),
            }),
        )
        .await;
        assert_eq!(bad.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plagiarism_score_boundaries() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;
        let paper = testutil::submit_paper(&state, &author, "On Computable Numbers").await;

        for score in [-1.0, 101.0] {
            let result = set_plagiarism_score(
                State(state.clone()),
                Path(paper.id.clone()),
                Query(PlagiarismQuery { score }),
            )
            .await;
            assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
        }

        for score in [0.0, 100.0] {
            let Json(updated) = set_plagiarism_score(
                State(state.clone()),
                Path(paper.id.clone()),
                Query(PlagiarismQuery { score }),
            )
            .await
            .unwrap();
            assert_eq!(updated.plagiarism_score, Some(score));
            assert!(updated.plagiarism_checked);
        }
    }

    #[tokio::test]
    async fn test_list_papers_newest_first() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;

        let first = testutil::submit_paper(&state, &author, "First").await;
        let second = testutil::submit_paper(&state, &author, "Second").await;

        let Json(all) = list_papers(State(state.clone())).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        let Json(by_author) =
            list_papers_by_author(State(state.clone()), Path(author.id.clone()))
                .await
                .unwrap();
        assert_eq!(by_author.len(), 2);

        let Json(submitted) =
            list_papers_by_status(State(state.clone()), Path("SUBMITTED".to_string()))
                .await
                .unwrap();
        assert_eq!(submitted.len(), 2);

        let bad = list_papers_by_status(State(state), Path("LOST".to_string())).await;
        assert_eq!(bad.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }
}
