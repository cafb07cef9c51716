use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// 评论长度上限，按 Unicode 码点计
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub path: String,
    pub depth: i64,
}

impl Comment {
    /// 纯构造：只做校验和 id/时间戳分配。
    /// path 与 depth 需要查父节点，由存储层填充。
    pub fn new(
        post_id: impl Into<String>,
        author: impl Into<String>,
        parent_id: Option<String>,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let post_id = post_id.into();
        let author = author.into();
        let content = content.into();

        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong);
        }
        if post_id.is_empty() {
            return Err(DomainError::InvalidReference("post_id"));
        }
        if author.is_empty() {
            return Err(DomainError::InvalidReference("author"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            post_id,
            author,
            parent_id,
            content,
            created_at: Utc::now().naive_utc(),
            path: String::new(),
            depth: 0,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: NaiveDateTime,
    pub allow_comments: bool,
}

impl Post {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        allow_comments: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            author: author.into(),
            created_at: Utc::now().naive_utc(),
            allow_comments,
        }
    }
}
