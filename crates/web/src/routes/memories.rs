//! Gallery routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::NewMemory;
use narinyland_core::{filter_memories, GalleryView, MemoryItem};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(default)]
    pub view: GalleryView,
}

/// Memories visible in the requested view, in gallery order.
pub async fn list_memories(
    State(state): State<AppState>,
    query: std::result::Result<Query<GalleryQuery>, QueryRejection>,
) -> Result<Json<Vec<MemoryItem>>> {
    let Query(query) = query?;
    let items = database::memory::list_memories(state.db.pool()).await?;
    Ok(Json(filter_memories(&items, query.view)))
}

/// Append a memory to the gallery.
pub async fn add_memory(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewMemory>, JsonRejection>,
) -> Result<(StatusCode, Json<MemoryItem>)> {
    let Json(new) = payload?;
    let item = database::memory::add_memory(state.db.pool(), &new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Remove a memory and, best effort, its stored object.
pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemoryItem>> {
    let item = database::memory::delete_memory(state.db.pool(), &id).await?;
    state.discard_media(&item.url).await;
    Ok(Json(item))
}
