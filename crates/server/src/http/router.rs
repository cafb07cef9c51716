use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{comments, posts, sse};
use crate::state::AppState;

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/api/posts", post(posts::create_post).get(posts::list_posts))
        .route("/api/posts/:id", get(posts::get_post))
        .route("/api/posts/:id/comments/toggle", post(posts::toggle_comments))
        .route("/api/posts/:id/comments", get(comments::list_post_comments))
        .route("/api/posts/:id/comments/sse", get(sse::comment_events))
        .route("/api/comments", post(comments::create_comment))
        .route("/api/comments/:id", get(comments::get_comment))
        .route("/api/comments/:id/children", get(comments::list_children))
        .layer(cors)
        .with_state(state)
}
