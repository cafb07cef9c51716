use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use domain::{Comment, DomainError, Post, MAX_COMMENT_LENGTH};

use crate::{CommentStore, PostStore};

#[derive(Default)]
struct CommentTables {
    comments: HashMap<String, Comment>,
    // 二级索引：根评论按帖子、子评论按父节点，均保持插入顺序
    roots_by_post: HashMap<String, Vec<String>>,
    children_by_parent: HashMap<String, Vec<String>>,
    totals_by_post: HashMap<String, i64>,
}

/// 内存后端：整个表加索引状态共用一把读写锁。
/// create 的“查父 + 插入”在同一次写锁内完成，父节点一经写入不再变化，
/// 因此子节点看到的 path 快照不会失效。
#[derive(Default)]
pub struct MemoryCommentStore {
    state: RwLock<CommentTables>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, mut comment: Comment) -> Result<Comment, DomainError> {
        if comment.content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong);
        }

        let mut state = self.state.write().unwrap();

        let parent_id = comment.parent_id.clone();
        match parent_id {
            None => {
                comment.path = comment.id.clone();
                comment.depth = 0;
                state
                    .roots_by_post
                    .entry(comment.post_id.clone())
                    .or_default()
                    .push(comment.id.clone());
            }
            Some(parent_id) => {
                let (parent_path, parent_depth) = match state.comments.get(&parent_id) {
                    Some(parent) => (parent.path.clone(), parent.depth),
                    None => return Err(DomainError::ParentNotFound),
                };
                comment.path = format!("{}.{}", parent_path, comment.id);
                comment.depth = parent_depth + 1;
                state
                    .children_by_parent
                    .entry(parent_id)
                    .or_default()
                    .push(comment.id.clone());
            }
        }

        *state
            .totals_by_post
            .entry(comment.post_id.clone())
            .or_insert(0) += 1;
        state.comments.insert(comment.id.clone(), comment.clone());

        Ok(comment)
    }

    async fn get_by_id(&self, id: &str) -> Result<Comment, DomainError> {
        let state = self.state.read().unwrap();
        state
            .comments
            .get(id)
            .cloned()
            .ok_or(DomainError::CommentNotFound)
    }

    async fn get_by_post(
        &self,
        post_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.read().unwrap();
        let ids = state.roots_by_post.get(post_id);
        Ok(window(collect(&state.comments, ids), limit, offset))
    }

    async fn get_children(
        &self,
        parent_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.read().unwrap();
        let ids = state.children_by_parent.get(parent_id);
        Ok(window(collect(&state.comments, ids), limit, offset))
    }

    async fn count_by_post(&self, post_id: &str) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.totals_by_post.get(post_id).copied().unwrap_or(0))
    }

    async fn count_children(&self, parent_id: &str) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .children_by_parent
            .get(parent_id)
            .map(|ids| ids.len() as i64)
            .unwrap_or(0))
    }
}

fn collect(comments: &HashMap<String, Comment>, ids: Option<&Vec<String>>) -> Vec<Comment> {
    ids.map(|ids| {
        ids.iter()
            .filter_map(|id| comments.get(id).cloned())
            .collect()
    })
    .unwrap_or_default()
}

fn window(mut items: Vec<Comment>, limit: i64, offset: i64) -> Vec<Comment> {
    // 稳定排序：created_at 相同的按插入顺序
    items.sort_by_key(|c| c.created_at);
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().unwrap();
        posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn get_by_id(&self, id: &str) -> Result<Post, DomainError> {
        let posts = self.posts.read().unwrap();
        posts.get(id).cloned().ok_or(DomainError::PostNotFound)
    }

    async fn get_all(&self) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.read().unwrap();
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by_key(|p| p.created_at);
        Ok(all)
    }

    async fn update(&self, post: Post) -> Result<(), DomainError> {
        let mut posts = self.posts.write().unwrap();
        if !posts.contains_key(&post.id) {
            return Err(DomainError::PostNotFound);
        }
        posts.insert(post.id.clone(), post);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut posts = self.posts.write().unwrap();
        posts
            .remove(id)
            .map(|_| ())
            .ok_or(DomainError::PostNotFound)
    }

    async fn toggle_comments(&self, post_id: &str, allow: bool) -> Result<(), DomainError> {
        let mut posts = self.posts.write().unwrap();
        match posts.get_mut(post_id) {
            Some(post) => {
                post.allow_comments = allow;
                Ok(())
            }
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn check_allowed_comments(&self, post_id: &str) -> Result<bool, DomainError> {
        let posts = self.posts.read().unwrap();
        posts
            .get(post_id)
            .map(|p| p.allow_comments)
            .ok_or(DomainError::PostNotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn concurrent_creates_do_not_lose_updates() {
        let store = Arc::new(MemoryCommentStore::new());

        // 先顺序建好 N 个根评论，再并发往每个根下挂一个回复
        let mut parents = Vec::new();
        for i in 0..16 {
            let root = Comment::new("p1", format!("author{}", i), None, "root").unwrap();
            parents.push(store.create(root).await.unwrap());
        }

        let mut handles = Vec::new();
        for parent in &parents {
            let store = Arc::clone(&store);
            let parent_id = parent.id.clone();
            handles.push(tokio::spawn(async move {
                let reply =
                    Comment::new("p1", "replier", Some(parent_id), "reply").unwrap();
                store.create(reply).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count_by_post("p1").await.unwrap(), 32);
        for parent in &parents {
            assert_eq!(store.count_children(&parent.id).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn toggle_comments_flips_the_gate() {
        let posts = MemoryPostStore::new();
        let post = posts
            .create(Post::new("title", "body", "author", true))
            .await
            .unwrap();

        assert!(posts.check_allowed_comments(&post.id).await.unwrap());

        posts.toggle_comments(&post.id, false).await.unwrap();
        assert!(!posts.check_allowed_comments(&post.id).await.unwrap());

        let err = posts.check_allowed_comments("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound));
    }
}
