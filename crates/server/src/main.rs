use std::sync::Arc;

use anyhow::Context;
use bridge::EventBus;
use dotenvy::dotenv;
use storage::{CommentStore, MemoryCommentStore, MemoryPostStore, PostStore, SqliteStore};
use tracing::info;

use server::config::Settings;
use server::http::router::build_router;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new().context("Failed to load configuration")?;

    // 后端只在启动时选定一次，此后两种实现行为必须不可区分
    let (posts, comments): (Arc<dyn PostStore>, Arc<dyn CommentStore>) =
        match settings.database.backend.as_str() {
            "sqlite" => {
                info!("using sqlite storage at {}", settings.database.url);
                let db = SqliteStore::new(&settings.database.url).await?;
                (Arc::new(db.clone()), Arc::new(db))
            }
            _ => {
                info!("using in-memory storage");
                (
                    Arc::new(MemoryPostStore::new()),
                    Arc::new(MemoryCommentStore::new()),
                )
            }
        };

    let state = AppState {
        posts,
        comments,
        bus: EventBus::new(),
    };

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
