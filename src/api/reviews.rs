//! Reviewer assessment endpoints.
//!
//! A review belongs to exactly one paper and one reviewer. Nothing stops
//! the same reviewer filing several reviews for one paper; assignment
//! discipline is an editorial concern, not a schema one.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Paper, Review, ReviewStatus, SubmitReviewRequest, User};
use crate::AppState;

use super::error::ApiError;
use super::papers::StatusQuery;

/// Submit a review for a paper. The reviewer is the authenticated caller.
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    reviewer: User,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let paper: Option<Paper> = sqlx::query_as("SELECT * FROM papers WHERE id = ?")
        .bind(&req.paper_id)
        .fetch_optional(&state.db)
        .await?;
    if paper.is_none() {
        return Err(ApiError::not_found("Paper not found"));
    }

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO reviews (id, paper_id, reviewer_id, status, comments,
                             overall_rating, technical_quality_rating, clarity_rating,
                             originality_rating, significance_rating,
                             submitted_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.paper_id)
    .bind(&reviewer.id)
    .bind(ReviewStatus::Submitted.to_string())
    .bind(&req.comments)
    .bind(req.overall_rating)
    .bind(req.technical_quality_rating)
    .bind(req.clarity_rating)
    .bind(req.originality_rating)
    .bind(req.significance_rating)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to submit review: {}", e);
        ApiError::database("Failed to submit review")
    })?;

    let review: Review = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(review_id = %review.id, paper_id = %review.paper_id, reviewer = %reviewer.email, "Review submitted");

    Ok((StatusCode::CREATED, Json(review)))
}

/// Get a review by id
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Review>, ApiError> {
    let review: Option<Review> = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let review = review.ok_or_else(|| ApiError::not_found("Review not found"))?;
    Ok(Json(review))
}

/// List reviews filed against a paper
pub async fn list_reviews_by_paper(
    State(state): State<Arc<AppState>>,
    Path(paper_id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews: Vec<Review> = sqlx::query_as("SELECT * FROM reviews WHERE paper_id = ?")
        .bind(&paper_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(reviews))
}

/// List reviews written by a reviewer
pub async fn list_reviews_by_reviewer(
    State(state): State<Arc<AppState>>,
    Path(reviewer_id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews: Vec<Review> = sqlx::query_as("SELECT * FROM reviews WHERE reviewer_id = ?")
        .bind(&reviewer_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(reviews))
}

/// List a reviewer's reviews still waiting to be written
pub async fn list_pending_reviews(
    State(state): State<Arc<AppState>>,
    Path(reviewer_id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews: Vec<Review> =
        sqlx::query_as("SELECT * FROM reviews WHERE reviewer_id = ? AND status = ?")
            .bind(&reviewer_id)
            .bind(ReviewStatus::Pending.to_string())
            .fetch_all(&state.db)
            .await?;

    Ok(Json(reviews))
}

/// Overwrite a review's status. No transition table is applied.
pub async fn update_review_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Review>, ApiError> {
    let status: ReviewStatus = query
        .status
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid review status: {}", query.status)))?;

    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("UPDATE reviews SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(&now)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Review not found"));
    }

    let review: Review = sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(review))
}

/// Delete a review
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Review not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
