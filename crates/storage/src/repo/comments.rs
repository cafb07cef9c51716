use async_trait::async_trait;
use domain::{Comment, DomainError, MAX_COMMENT_LENGTH};

use crate::models::SqlComment;
use crate::{CommentStore, SqliteStore};

#[async_trait]
impl CommentStore for SqliteStore {
    async fn create(&self, mut comment: Comment) -> Result<Comment, DomainError> {
        if comment.content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong);
        }

        // 查父与插入在同一事务内，失败时整体回滚，不留半挂载的行
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage("create comment", e))?;

        match comment.parent_id.clone() {
            None => {
                comment.path = comment.id.clone();
                comment.depth = 0;
            }
            Some(parent_id) => {
                let parent = sqlx::query_as::<_, (String, i64)>(
                    "SELECT path, depth FROM comments WHERE id = ?",
                )
                .bind(&parent_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DomainError::storage("get parent comment", e))?;

                let (parent_path, parent_depth) = parent.ok_or(DomainError::ParentNotFound)?;
                comment.path = format!("{}.{}", parent_path, comment.id);
                comment.depth = parent_depth + 1;
            }
        }

        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, parent_id, author, content, path, depth, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.parent_id)
        .bind(&comment.author)
        .bind(&comment.content)
        .bind(&comment.path)
        .bind(comment.depth)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage("insert comment", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage("create comment", e))?;

        Ok(comment)
    }

    async fn get_by_id(&self, id: &str) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, post_id, parent_id, author, content, path, depth, created_at
            FROM comments WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage("get comment by id", e))?;

        row.map(Into::into).ok_or(DomainError::CommentNotFound)
    }

    async fn get_by_post(
        &self,
        post_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        // rowid 打破 created_at 平局，保持插入顺序
        let rows = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, post_id, parent_id, author, content, path, depth, created_at
            FROM comments
            WHERE post_id = ? AND parent_id IS NULL
            ORDER BY created_at ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(post_id)
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage("get comments by post", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_children(
        &self,
        parent_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, post_id, parent_id, author, content, path, depth, created_at
            FROM comments
            WHERE parent_id = ?
            ORDER BY created_at ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(parent_id)
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage("get children", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_post(&self, post_id: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage("count comments by post", e))
    }

    async fn count_children(&self, parent_id: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE parent_id = ?")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage("count children", e))
    }
}
