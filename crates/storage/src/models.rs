use chrono::NaiveDateTime;
use domain::{Comment, Post};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub author: String,
    pub content: String,
    pub path: String,
    pub depth: i64,
    pub created_at: NaiveDateTime,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            post_id: sql.post_id,
            author: sql.author,
            parent_id: sql.parent_id,
            content: sql.content,
            created_at: sql.created_at,
            path: sql.path,
            depth: sql.depth,
        }
    }
}

#[derive(FromRow)]
pub struct SqlPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub allow_comments: bool,
    pub created_at: NaiveDateTime,
}

impl From<SqlPost> for Post {
    fn from(sql: SqlPost) -> Self {
        Post {
            id: sql.id,
            title: sql.title,
            content: sql.content,
            author: sql.author,
            created_at: sql.created_at,
            allow_comments: sql.allow_comments,
        }
    }
}
