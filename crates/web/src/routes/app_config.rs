//! Shared app configuration routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use database::{AppConfig, ConfigUpdate, NewMemory, Partner};
use narinyland_core::MemoryItem;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

/// Configuration together with the partners and the gallery.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub config: AppConfig,
    pub partners: Vec<Partner>,
    pub memories: Vec<MemoryItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerName {
    pub id: String,
    pub name: String,
}

/// Partial update. Absent fields are left alone.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[serde(flatten)]
    pub config: ConfigUpdate,
    #[serde(default)]
    pub partners: Option<Vec<PartnerName>>,
    /// Replaces the whole gallery when present.
    #[serde(default)]
    pub memories: Option<Vec<NewMemory>>,
}

/// Get the configuration.
pub async fn get_config(State(state): State<AppState>) -> Result<Json<ConfigResponse>> {
    Ok(Json(load(&state).await?))
}

/// Update the configuration, renaming partners and replacing the gallery
/// when asked to.
pub async fn update_config(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateConfigRequest>, JsonRejection>,
) -> Result<Json<ConfigResponse>> {
    let Json(request) = payload?;
    let pool = state.db.pool();

    database::app_config::update_config(pool, &request.config).await?;

    for partner in request.partners.iter().flatten() {
        database::partner::rename_partner(pool, &partner.id, &partner.name).await?;
    }

    if let Some(memories) = &request.memories {
        let removed = database::memory::replace_memories(pool, memories).await?;
        for item in &removed {
            state.discard_media(&item.url).await;
        }
        info!(count = memories.len(), removed = removed.len(), "Gallery updated");
    }

    Ok(Json(load(&state).await?))
}

async fn load(state: &AppState) -> Result<ConfigResponse> {
    let pool = state.db.pool();
    Ok(ConfigResponse {
        config: database::app_config::get_config(pool).await?,
        partners: database::partner::list_partners(pool).await?,
        memories: database::memory::list_memories(pool).await?,
    })
}
