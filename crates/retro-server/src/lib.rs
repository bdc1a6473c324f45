pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use retro_core::store::DocStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(store: DocStore) -> Router {
    let app_state = state::AppState::new(store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Sprints
        .route("/api/sprints", get(routes::sprints::list_sprints))
        .route("/api/sprints", post(routes::sprints::create_sprint))
        .route("/api/sprints/{id}", delete(routes::sprints::delete_sprint))
        // Retro items
        .route("/api/items", get(routes::items::list_items))
        .route("/api/items", post(routes::items::create_item))
        .route("/api/items/{id}", patch(routes::items::update_item))
        .route("/api/items/{id}", delete(routes::items::delete_item))
        // Orphan migration
        .route("/api/orphans", get(routes::orphans::orphan_count))
        .route("/api/orphans/assign", post(routes::orphans::assign_orphans))
        // Consolidated action items
        .route(
            "/api/action-items",
            get(routes::action_items::list_action_items),
        )
        .route(
            "/api/action-items/export",
            get(routes::action_items::export_action_items),
        )
        .fallback(embed::static_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the board server on `port`.
pub async fn serve(store: DocStore, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(store, listener, open_browser).await
}

/// Start the board server on a pre-bound listener.
///
/// Accepting a `TcpListener` lets the caller bind port 0 and read the
/// OS-assigned port before starting.
pub async fn serve_on(
    store: DocStore,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(store);

    tracing::info!("retro board listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
