//! Records API endpoints

use api_types::record::{Record, RecordNew, RecordPatch};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Json<Vec<Record>> {
    Json(state.store.list().await)
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<RecordNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ServerError> {
    let Json(payload) = payload?;
    let record = state.store.create(payload).await?;
    tracing::info!("created record {} ({})", record.id, record.kind.as_str());

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<RecordPatch>, JsonRejection>,
) -> Result<Json<Record>, ServerError> {
    let Json(payload) = payload?;
    let record = state.store.update(&id, payload).await?;
    tracing::info!("updated record {id}");

    Ok(Json(record))
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> StatusCode {
    let removed = state.store.delete(&id).await;
    if removed > 0 {
        tracing::info!("deleted record {id}");
    } else {
        tracing::debug!("delete of unknown record {id}");
    }

    StatusCode::NO_CONTENT
}
