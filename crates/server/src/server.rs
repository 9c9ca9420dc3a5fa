use axum::{
    Router,
    routing::{get, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::records;
use engine::RecordStore;

#[derive(Clone)]
pub struct ServerState {
    pub store: RecordStore,
}

/// Builds the `/records` API over `store`.
///
/// Cross-origin requests are allowed from anywhere.
pub fn router(store: RecordStore) -> Router {
    let state = ServerState { store };

    Router::new()
        .route("/records", get(records::list).post(records::create))
        .route(
            "/records/{id}",
            put(records::update).delete(records::delete),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    store: RecordStore,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(store)).await
}

pub fn spawn_with_listener(
    store: RecordStore,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(store, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
