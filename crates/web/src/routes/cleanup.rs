//! Orphaned object and broken memory maintenance.
//!
//! An object is orphaned when no row references its URL. A memory is broken
//! when its URL belongs to this store but the object is gone. URLs pointing
//! elsewhere are never touched.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use narinyland_core::MemoryItem;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub stored_objects: usize,
    pub referenced_objects: usize,
    pub orphaned_objects: Vec<String>,
    pub broken_memories: Vec<MemoryItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResult {
    pub deleted_objects: usize,
    pub deleted_memories: usize,
    pub failed: Vec<String>,
}

/// Report what a purge would remove.
pub async fn report(State(state): State<AppState>) -> Result<Json<CleanupReport>> {
    Ok(Json(inspect(&state).await?))
}

/// Delete orphaned objects and broken memory rows.
pub async fn purge(State(state): State<AppState>) -> Result<Json<PurgeResult>> {
    let report = inspect(&state).await?;
    let mut result = PurgeResult {
        deleted_objects: 0,
        deleted_memories: 0,
        failed: Vec::new(),
    };

    for key in &report.orphaned_objects {
        match state.store.delete(key).await {
            Ok(true) => result.deleted_objects += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to delete orphaned object");
                result.failed.push(key.clone());
            }
        }
    }

    for item in &report.broken_memories {
        database::memory::delete_memory(state.db.pool(), &item.id).await?;
        result.deleted_memories += 1;
    }

    info!(
        objects = result.deleted_objects,
        memories = result.deleted_memories,
        failed = result.failed.len(),
        "Cleanup finished"
    );

    Ok(Json(result))
}

async fn inspect(state: &AppState) -> Result<CleanupReport> {
    let pool = state.db.pool();

    let stored: BTreeSet<String> = state.store.list_keys().await?.into_iter().collect();
    let referenced: BTreeSet<String> = database::references::referenced_urls(pool)
        .await?
        .iter()
        .filter_map(|url| state.store.key_for_url(url))
        .collect();

    let orphaned_objects = stored.difference(&referenced).cloned().collect();

    let broken_memories = database::memory::list_memories(pool)
        .await?
        .into_iter()
        .filter(|item| {
            state
                .store
                .key_for_url(&item.url)
                .is_some_and(|key| !stored.contains(&key))
        })
        .collect();

    Ok(CleanupReport {
        stored_objects: stored.len(),
        referenced_objects: referenced.len(),
        orphaned_objects,
        broken_memories,
    })
}
