use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio_stream::StreamExt;

use crate::http::handlers::comments::comment_topic;
use crate::state::AppState;

/// 每个连接一条桥接订阅；客户端断开即丢弃订阅，
/// 中继任务和传输层注册随之释放。
pub async fn comment_events(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.bus.subscribe(&comment_topic(&post_id));
    tracing::info!(%post_id, "SSE subscriber connected");

    let stream = subscription.into_stream().map(|payload| {
        Ok::<_, axum::Error>(
            Event::default()
                .event("new_comment")
                .data(String::from_utf8_lossy(&payload).into_owned()),
        )
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15)))
}
