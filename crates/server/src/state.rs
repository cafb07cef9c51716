use std::sync::Arc;

use bridge::EventBus;
use storage::{CommentStore, PostStore};

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
    pub comments: Arc<dyn CommentStore>,
    pub bus: EventBus,
}
