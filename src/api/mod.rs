pub mod auth;
pub mod error;
mod papers;
mod reviews;
mod revisions;
mod users;
pub mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/validate", get(auth::validate));

    let user_routes = Router::new()
        .route("/:id", get(users::get_user))
        .route("/:id", put(users::update_user))
        .route("/:id", delete(users::deactivate_user))
        .route("/email/:email", get(users::get_user_by_email))
        .route("/role/:role", get(users::list_users_by_role));

    let paper_routes = Router::new()
        .route("/", get(papers::list_papers))
        .route("/", post(papers::submit_paper))
        .route("/:id", get(papers::get_paper))
        .route("/:id", delete(papers::delete_paper))
        .route("/:id/status", put(papers::update_paper_status))
        .route("/:id/plagiarism", put(papers::set_plagiarism_score))
        .route("/author/:author_id", get(papers::list_papers_by_author))
        .route("/status/:status", get(papers::list_papers_by_status));

    let review_routes = Router::new()
        .route("/", post(reviews::submit_review))
        .route("/:id", get(reviews::get_review))
        .route("/:id", delete(reviews::delete_review))
        .route("/:id/status", put(reviews::update_review_status))
        .route("/paper/:paper_id", get(reviews::list_reviews_by_paper))
        .route("/reviewer/:reviewer_id", get(reviews::list_reviews_by_reviewer))
        .route(
            "/reviewer/:reviewer_id/pending",
            get(reviews::list_pending_reviews),
        );

    let revision_routes = Router::new()
        .route("/", post(revisions::submit_revision))
        .route("/:id", get(revisions::get_revision))
        .route("/:id", delete(revisions::delete_revision))
        .route("/paper/:paper_id", get(revisions::list_revisions_by_paper))
        .route(
            "/paper/:paper_id/ordered",
            get(revisions::list_revisions_ordered),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/papers", paper_routes)
        .nest("/api/reviews", review_routes)
        .nest("/api/revisions", revision_routes)
        .route("/api/debug/users", get(users::debug_list_users))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
