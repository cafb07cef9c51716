use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::{Comment, DomainError};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::state::AppState;

/// 主题命名归调用方管：固定前缀加帖子 id。
pub fn comment_topic(post_id: &str) -> String {
    format!("comments:{}", post_id)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Serialize)]
pub struct CommentPage {
    pub items: Vec<Comment>,
    pub total: i64,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    // Post Gate 在写入前询问；存储本身不管这个开关
    if !state.posts.check_allowed_comments(&payload.post_id).await? {
        return Err(DomainError::CommentsDisabled.into());
    }

    let comment = Comment::new(
        payload.post_id,
        payload.author,
        payload.parent_id,
        payload.content,
    )?;
    let comment = state.comments.create(comment).await?;

    // 投递是尽力而为，失败不回滚已落盘的评论
    if let Err(e) = state
        .bus
        .publish(&comment_topic(&comment.post_id), &comment)
    {
        tracing::error!(error = %e, "failed to publish comment event");
    }

    Ok(Json(comment))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.comments.get_by_id(&id).await?;
    Ok(Json(comment))
}

pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<CommentPage>, ApiError> {
    let items = state
        .comments
        .get_by_post(&post_id, page.limit, page.offset)
        .await?;
    let total = state.comments.count_by_post(&post_id).await?;
    Ok(Json(CommentPage { items, total }))
}

pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<CommentPage>, ApiError> {
    let items = state
        .comments
        .get_children(&id, page.limit, page.offset)
        .await?;
    let total = state.comments.count_children(&id).await?;
    Ok(Json(CommentPage { items, total }))
}
