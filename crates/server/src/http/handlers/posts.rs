use axum::{
    extract::{Path, State},
    Json,
};
use domain::Post;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default = "default_allow_comments")]
    pub allow_comments: bool,
}

fn default_allow_comments() -> bool {
    true
}

#[derive(Deserialize)]
pub struct ToggleCommentsRequest {
    pub allow: bool,
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = Post::new(
        payload.title,
        payload.content,
        payload.author,
        payload.allow_comments,
    );
    let post = state.posts.create(post).await?;
    Ok(Json(post))
}

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.posts.get_all().await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state.posts.get_by_id(&id).await?;
    Ok(Json(post))
}

pub async fn toggle_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleCommentsRequest>,
) -> Result<Json<Post>, ApiError> {
    state.posts.toggle_comments(&id, payload.allow).await?;
    let post = state.posts.get_by_id(&id).await?;
    Ok(Json(post))
}
