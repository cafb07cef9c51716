use thiserror::Error;

use crate::models::MAX_COMMENT_LENGTH;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("comment is too long (max {MAX_COMMENT_LENGTH} characters)")]
    ContentTooLong,

    #[error("{0} cannot be empty")]
    InvalidReference(&'static str),

    #[error("parent comment not found")]
    ParentNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("post not found")]
    PostNotFound,

    #[error("comments off for this post")]
    CommentsDisabled,

    #[error("storage unavailable during {op}")]
    StorageUnavailable {
        op: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DomainError {
    pub fn storage(
        op: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StorageUnavailable {
            op,
            source: Box::new(source),
        }
    }
}
