use chrono::NaiveDate;
use domain::{Comment, DomainError, Post};
use storage::{CommentStore, MemoryCommentStore, MemoryPostStore, PostStore, SqliteStore};
use tempfile::TempDir;

fn comment(post_id: &str, parent_id: Option<&str>, content: &str) -> Comment {
    Comment::new(post_id, "tester", parent_id.map(str::to_string), content).unwrap()
}

fn at(day: u32, second: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(12, 0, second)
        .unwrap()
}

async fn sqlite_store() -> (SqliteStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}/threads.db", dir.path().display());
    let store = SqliteStore::new(&url).await.unwrap();
    (store, dir)
}

async fn check_root_create(store: &dyn CommentStore) {
    let created = store.create(comment("p1", None, "root")).await.unwrap();

    assert_eq!(created.path, created.id);
    assert_eq!(created.depth, 0);

    let fetched = store.get_by_id(&created.id).await.unwrap();
    assert_eq!(fetched.path, created.path);
    assert_eq!(fetched.depth, 0);
}

async fn check_reply_chain(store: &dyn CommentStore) {
    let a = store.create(comment("p1", None, "A")).await.unwrap();
    let b = store
        .create(comment("p1", Some(&a.id), "B"))
        .await
        .unwrap();
    let c = store
        .create(comment("p1", Some(&b.id), "C"))
        .await
        .unwrap();

    assert_eq!(b.path, format!("{}.{}", a.id, b.id));
    assert_eq!(b.depth, 1);
    assert_eq!(c.path, format!("{}.{}.{}", a.id, b.id, c.id));
    assert_eq!(c.depth, 2);

    let roots = store.get_by_post("p1", 10, 0).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, a.id);

    let children_of_a = store.get_children(&a.id, 10, 0).await.unwrap();
    assert_eq!(children_of_a.len(), 1);
    assert_eq!(children_of_a[0].id, b.id);

    let children_of_b = store.get_children(&b.id, 10, 0).await.unwrap();
    assert_eq!(children_of_b.len(), 1);
    assert_eq!(children_of_b[0].id, c.id);
}

async fn check_orphan_is_rejected_without_trace(store: &dyn CommentStore) {
    store.create(comment("p1", None, "root")).await.unwrap();

    let orphan = comment("p1", Some("no-such-comment"), "orphan");
    let orphan_id = orphan.id.clone();
    let err = store.create(orphan).await.unwrap_err();
    assert!(matches!(err, DomainError::ParentNotFound));

    // 失败的 create 不得留下任何索引痕迹
    assert_eq!(store.count_by_post("p1").await.unwrap(), 1);
    assert_eq!(store.get_by_post("p1", 10, 0).await.unwrap().len(), 1);
    assert!(matches!(
        store.get_by_id(&orphan_id).await.unwrap_err(),
        DomainError::CommentNotFound
    ));
}

async fn check_roots_ordering_and_window(store: &dyn CommentStore) {
    // 乱序插入，读取时必须按 created_at 升序
    let mut first = comment("p1", None, "first");
    first.created_at = at(1, 0);
    let mut third = comment("p1", None, "third");
    third.created_at = at(3, 0);
    let mut second = comment("p1", None, "second");
    second.created_at = at(2, 0);

    let first = store.create(first).await.unwrap();
    let third = store.create(third).await.unwrap();
    let second = store.create(second).await.unwrap();

    // 噪音：别的帖子和一条回复都不能混进根列表
    store.create(comment("p2", None, "other post")).await.unwrap();
    store
        .create(comment("p1", Some(&first.id), "reply"))
        .await
        .unwrap();

    let roots = store.get_by_post("p1", 10, 0).await.unwrap();
    let ids: Vec<&str> = roots.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![&first.id, &second.id, &third.id]);
    assert!(roots.iter().all(|c| c.parent_id.is_none()));

    // 窗口：limit 截断、offset 越界返回空、limit 0 返回空
    let page = store.get_by_post("p1", 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, first.id);
    assert_eq!(page[1].id, second.id);

    let page = store.get_by_post("p1", 2, 2).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, third.id);

    assert!(store.get_by_post("p1", 10, 3).await.unwrap().is_empty());
    assert!(store.get_by_post("p1", 10, 99).await.unwrap().is_empty());
    assert!(store.get_by_post("p1", 0, 0).await.unwrap().is_empty());
}

async fn check_equal_timestamps_keep_insertion_order(store: &dyn CommentStore) {
    let mut one = comment("p1", None, "one");
    one.created_at = at(1, 0);
    let mut two = comment("p1", None, "two");
    two.created_at = at(1, 0);

    let one = store.create(one).await.unwrap();
    let two = store.create(two).await.unwrap();

    let roots = store.get_by_post("p1", 10, 0).await.unwrap();
    let ids: Vec<&str> = roots.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![&one.id, &two.id]);
}

async fn check_children_window(store: &dyn CommentStore) {
    let root = store.create(comment("p1", None, "root")).await.unwrap();
    let mut created = Vec::new();
    for i in 0..5 {
        let mut reply = comment("p1", Some(&root.id), "reply");
        reply.created_at = at(1, i);
        created.push(store.create(reply).await.unwrap());
    }
    // 孙辈不得出现在 root 的直接子级里
    store
        .create(comment("p1", Some(&created[0].id), "grandchild"))
        .await
        .unwrap();

    let children = store.get_children(&root.id, 10, 0).await.unwrap();
    assert_eq!(children.len(), 5);
    for (child, expected) in children.iter().zip(&created) {
        assert_eq!(child.id, expected.id);
        assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
    }

    let page = store.get_children(&root.id, 2, 4).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, created[4].id);

    assert!(store.get_children(&root.id, 10, 5).await.unwrap().is_empty());
    assert!(store.get_children(&root.id, 0, 0).await.unwrap().is_empty());
}

async fn check_counts(store: &dyn CommentStore) {
    let root = store.create(comment("p1", None, "root")).await.unwrap();
    let reply = store
        .create(comment("p1", Some(&root.id), "reply"))
        .await
        .unwrap();
    store
        .create(comment("p1", Some(&reply.id), "nested"))
        .await
        .unwrap();
    store.create(comment("p2", None, "elsewhere")).await.unwrap();

    // count_by_post 统计各级评论，不只根
    assert_eq!(store.count_by_post("p1").await.unwrap(), 3);
    assert_eq!(store.count_by_post("p2").await.unwrap(), 1);
    assert_eq!(store.count_by_post("empty").await.unwrap(), 0);

    assert_eq!(store.count_children(&root.id).await.unwrap(), 1);
    assert_eq!(store.count_children(&reply.id).await.unwrap(), 1);
    assert_eq!(store.count_children("missing").await.unwrap(), 0);
}

async fn check_get_by_id_miss(store: &dyn CommentStore) {
    assert!(matches!(
        store.get_by_id("nope").await.unwrap_err(),
        DomainError::CommentNotFound
    ));
}

async fn check_store_rechecks_content_length(store: &dyn CommentStore) {
    let mut oversized = comment("p1", None, "placeholder");
    oversized.content = "x".repeat(2001);

    let err = store.create(oversized).await.unwrap_err();
    assert!(matches!(err, DomainError::ContentTooLong));
    assert_eq!(store.count_by_post("p1").await.unwrap(), 0);
}

async fn check_post_crud(store: &dyn PostStore) {
    let post = store
        .create(Post::new("Title", "Body", "author", true))
        .await
        .unwrap();

    let fetched = store.get_by_id(&post.id).await.unwrap();
    assert_eq!(fetched.title, "Title");
    assert!(fetched.allow_comments);

    let mut changed = fetched.clone();
    changed.title = "Edited".to_string();
    store.update(changed).await.unwrap();
    assert_eq!(store.get_by_id(&post.id).await.unwrap().title, "Edited");

    store.toggle_comments(&post.id, false).await.unwrap();
    assert!(!store.check_allowed_comments(&post.id).await.unwrap());

    assert_eq!(store.get_all().await.unwrap().len(), 1);

    store.delete(&post.id).await.unwrap();
    assert!(matches!(
        store.get_by_id(&post.id).await.unwrap_err(),
        DomainError::PostNotFound
    ));
    assert!(matches!(
        store.update(post).await.unwrap_err(),
        DomainError::PostNotFound
    ));
    assert!(matches!(
        store.delete("gone").await.unwrap_err(),
        DomainError::PostNotFound
    ));
    assert!(matches!(
        store.toggle_comments("gone", true).await.unwrap_err(),
        DomainError::PostNotFound
    ));
    assert!(matches!(
        store.check_allowed_comments("gone").await.unwrap_err(),
        DomainError::PostNotFound
    ));
}

#[tokio::test]
async fn memory_post_crud() {
    let store = MemoryPostStore::new();
    check_post_crud(&store).await;
}

#[tokio::test]
async fn sqlite_post_crud() {
    let (store, _dir) = sqlite_store().await;
    check_post_crud(&store).await;
}

macro_rules! backend_tests {
    ($($name:ident => $check:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let store = MemoryCommentStore::new();
                    $check(&store).await;
                }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let (store, _dir) = sqlite_store().await;
                    $check(&store).await;
                }
            )*
        }
    };
}

backend_tests! {
    root_create_sets_path_and_depth => check_root_create,
    reply_chain_materializes_ancestry => check_reply_chain,
    orphan_is_rejected_without_trace => check_orphan_is_rejected_without_trace,
    roots_ordering_and_window => check_roots_ordering_and_window,
    equal_timestamps_keep_insertion_order => check_equal_timestamps_keep_insertion_order,
    children_window => check_children_window,
    counts => check_counts,
    get_by_id_miss => check_get_by_id_miss,
    store_rechecks_content_length => check_store_rechecks_content_length,
}
