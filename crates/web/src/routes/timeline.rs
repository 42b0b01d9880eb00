//! Timeline event routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{NewTimelineEvent, TimelineEventUpdate};
use narinyland_core::TimelineEvent;

use crate::error::Result;
use crate::state::AppState;

/// All stored events, oldest first.
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<TimelineEvent>>> {
    Ok(Json(database::timeline::list_events(state.db.pool()).await?))
}

/// Create an event. Without a timestamp it happens now.
pub async fn create_event(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewTimelineEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<TimelineEvent>)> {
    let Json(new) = payload?;
    let event = database::timeline::create_event(state.db.pool(), &new).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimelineEvent>> {
    Ok(Json(database::timeline::get_event(state.db.pool(), &id).await?))
}

/// Partially update an event. Replaced media is discarded.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<TimelineEventUpdate>, JsonRejection>,
) -> Result<Json<TimelineEvent>> {
    let Json(update) = payload?;
    let pool = state.db.pool();

    let before = database::timeline::get_event(pool, &id).await?;
    let after = database::timeline::update_event(pool, &id, &update).await?;

    if let Some(old) = &before.media {
        let still_used = after.media.as_ref().is_some_and(|m| m.url == old.url);
        if !still_used {
            state.discard_media(&old.url).await;
        }
    }

    Ok(Json(after))
}

/// Delete an event and, best effort, its media.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimelineEvent>> {
    let event = database::timeline::delete_event(state.db.pool(), &id).await?;
    if let Some(media) = &event.media {
        state.discard_media(&media.url).await;
    }
    Ok(Json(event))
}
