use async_trait::async_trait;
use domain::{Comment, DomainError, Post};

mod memory;
mod models;
mod repo;
mod sqlite;

pub use memory::{MemoryCommentStore, MemoryPostStore};
pub use sqlite::SqliteStore;

/// 线程化评论存储。两个实现（内存 / SQLite）必须表现一致：
/// create 负责定位父节点并落盘 path/depth，查询只按给定窗口读。
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// 将已通过校验的评论放入回复树并持久化。
    /// 父节点缺失返回 ParentNotFound，且不留下任何索引痕迹。
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError>;

    async fn get_by_id(&self, id: &str) -> Result<Comment, DomainError>;

    /// 只返回根评论，created_at 升序，平局按插入顺序。
    async fn get_by_post(
        &self,
        post_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, DomainError>;

    /// 只返回直接子级（单层），排序分页规则同上。
    async fn get_children(
        &self,
        parent_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, DomainError>;

    /// 帖子下全部评论数（含各级回复），供调用方算 has-more。
    async fn count_by_post(&self, post_id: &str) -> Result<i64, DomainError>;

    async fn count_children(&self, parent_id: &str) -> Result<i64, DomainError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn get_by_id(&self, id: &str) -> Result<Post, DomainError>;
    async fn get_all(&self) -> Result<Vec<Post>, DomainError>;
    async fn update(&self, post: Post) -> Result<(), DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    async fn toggle_comments(&self, post_id: &str, allow: bool) -> Result<(), DomainError>;

    /// 评论开关。创建评论的一方在写入前询问，评论存储自身不调用。
    async fn check_allowed_comments(&self, post_id: &str) -> Result<bool, DomainError>;
}
