use async_trait::async_trait;
use domain::{DomainError, Post};

use crate::models::SqlPost;
use crate::{PostStore, SqliteStore};

#[async_trait]
impl PostStore for SqliteStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, author, allow_comments, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.allow_comments)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage("create post", e))?;

        Ok(post)
    }

    async fn get_by_id(&self, id: &str) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, SqlPost>(
            "SELECT id, title, content, author, allow_comments, created_at FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage("get post by id", e))?;

        row.map(Into::into).ok_or(DomainError::PostNotFound)
    }

    async fn get_all(&self) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, SqlPost>(
            r#"
            SELECT id, title, content, author, allow_comments, created_at
            FROM posts
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage("get all posts", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, post: Post) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET title = ?, content = ?, author = ?, allow_comments = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.allow_comments)
        .bind(&post.id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage("update post", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PostNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("delete post", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PostNotFound);
        }
        Ok(())
    }

    async fn toggle_comments(&self, post_id: &str, allow: bool) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE posts SET allow_comments = ? WHERE id = ?")
            .bind(allow)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("toggle comments", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PostNotFound);
        }
        Ok(())
    }

    async fn check_allowed_comments(&self, post_id: &str) -> Result<bool, DomainError> {
        let allow = sqlx::query_scalar::<_, bool>("SELECT allow_comments FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("check allowed comments", e))?;

        allow.ok_or(DomainError::PostNotFound)
    }
}
