//! Revision submission endpoints.
//!
//! Revision numbers are dense and 1-based per paper. The number is
//! assigned inside a transaction, and the schema's UNIQUE(paper_id,
//! revision_number) turns a lost race into a conflict instead of a
//! duplicate version.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Paper, Revision, SubmitRevisionRequest};
use crate::AppState;

use super::error::ApiError;

/// Submit a new revision of a paper
pub async fn submit_revision(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRevisionRequest>,
) -> Result<(StatusCode, Json<Revision>), ApiError> {
    let paper: Option<Paper> = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&req.paper_id)
        .fetch_optional(&state.db)
        .await?;
    if paper.is_none() {
        return Err(ApiError::not_found("Paper not found"));
    }

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    let (max_number,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(revision_number), 0) FROM revisions WHERE paper_id = ?")
            .bind(&req.paper_id)
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query(
        r#"
        INSERT INTO revisions (id, paper_id, revision_number, content, changes_summary,
                               submitted_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.paper_id)
    .bind(max_number + 1)
    .bind(&req.content)
    .bind(&req.changes_summary)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let revision: Revision = sqlx::query_as("SELECT * FROM revisions WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(
        paper_id = %revision.paper_id,
        revision_number = revision.revision_number,
        "Revision submitted"
    );

    Ok((StatusCode::CREATED, Json(revision)))
}

/// Get a revision by id
pub async fn get_revision(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Revision>, ApiError> {
    let revision: Option<Revision> = sqlx::query_as("SELECT * FROM revisions WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let revision = revision.ok_or_else(|| ApiError::not_found("Revision not found"))?;
    Ok(Json(revision))
}

/// List revisions of a paper in storage order
pub async fn list_revisions_by_paper(
    State(state): State<Arc<AppState>>,
    Path(paper_id): Path<String>,
) -> Result<Json<Vec<Revision>>, ApiError> {
    let revisions: Vec<Revision> = sqlx::query_as("SELECT * FROM revisions WHERE paper_id = ?")
        .bind(&paper_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(revisions))
}

/// List revisions of a paper, most recent version first
pub async fn list_revisions_ordered(
    State(state): State<Arc<AppState>>,
    Path(paper_id): Path<String>,
) -> Result<Json<Vec<Revision>>, ApiError> {
    let revisions: Vec<Revision> = sqlx::query_as(
        "SELECT * FROM revisions WHERE paper_id = ? ORDER BY revision_number DESC",
    )
    .bind(&paper_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(revisions))
}

/// Delete a revision
pub async fn delete_revision(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM revisions WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Revision not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil;

    #[tokio::test]
    async fn test_revision_numbers_are_dense_from_one() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;
        let paper = testutil::submit_paper(&state, &author, "Flow Diagrams").await;

        for expected in 1..=4 {
            let (status, Json(revision)) = submit_revision(
                State(state.clone()),
                Json(SubmitRevisionRequest {
                    paper_id: paper.id.clone(),
                    content: format!("draft {}", expected),
                    changes_summary: Some(format!("pass {}", expected)),
                }),
            )
            .await
            .unwrap();
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(revision.revision_number, expected);
        }
    }

    #[tokio::test]
    async fn test_ordered_listing_is_descending() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;
        let paper = testutil::submit_paper(&state, &author, "Flow Diagrams").await;

        for n in 1..=3 {
            testutil::submit_revision(&state, &paper, &format!("draft {}", n)).await;
        }

        let Json(ordered) = list_revisions_ordered(State(state.clone()), Path(paper.id.clone()))
            .await
            .unwrap();
        let numbers: Vec<i64> = ordered.iter().map(|r| r.revision_number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);

        let Json(unordered) = list_revisions_by_paper(State(state), Path(paper.id))
            .await
            .unwrap();
        assert_eq!(unordered.len(), 3);
    }

    #[tokio::test]
    async fn test_submit_for_unknown_paper_not_found() {
        let state = testutil::state().await;

        let result = submit_revision(
            State(state),
            Json(SubmitRevisionRequest {
                paper_id: "no-such-paper".to_string(),
                content: "draft".to_string(),
                changes_summary: None,
            }),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_revision() {
        let state = testutil::state().await;
        let (_, author) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;
        let paper = testutil::submit_paper(&state, &author, "Flow Diagrams").await;
        let revision = testutil::submit_revision(&state, &paper, "draft 1").await;

        let status = delete_revision(State(state.clone()), Path(revision.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let again = delete_revision(State(state), Path(revision.id)).await;
        assert_eq!(again.unwrap_err().status(), StatusCode::NOT_FOUND);
    }
}
