use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::health))
        .route("/api/blogs/all", get(handlers::list_articles))
        .route("/api/blogs/published", get(handlers::list_published))
        .route("/api/blogs/generate", post(handlers::generate_articles))
        .route(
            "/api/blogs/:id",
            put(handlers::update_article).delete(handlers::delete_article),
        )
        .route("/api/blogs/:id/publish", post(handlers::publish_article))
        .route("/api/blogs/:id/schedule", post(handlers::schedule_article))
        .route("/api/blogs/:id/publish-to-target", post(handlers::publish_to_target))
        .route("/api/settings/get", get(handlers::get_settings))
        .route("/api/settings/update", put(handlers::update_settings))
        .route("/api/settings/update-keywords", put(handlers::update_keywords))
        .route("/api/settings/delete-keyword/:index", delete(handlers::delete_keyword))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process stops.
pub async fn serve(state: AppState, addr: SocketAddr) -> bp_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState};
    pub use bp_core::{Article, Error, Result};
}
