//! Shared app configuration (a single row).

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{AppConfig, AppConfigRow, ConfigUpdate};
use crate::validation::{
    validate_date, validate_text, validate_url, validate_zoom, MAX_TITLE_LENGTH,
};

/// Get the app configuration.
pub async fn get_config(pool: &SqlitePool) -> Result<AppConfig> {
    let row = sqlx::query_as::<_, AppConfigRow>(
        r#"
        SELECT app_name, anniversary_date, proposal_accepted, music_url,
               timeline_layout, timeline_zoom, updated_at
        FROM app_config
        WHERE id = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    row.try_into()
}

/// Apply a partial update and return the new configuration.
pub async fn update_config(pool: &SqlitePool, update: &ConfigUpdate) -> Result<AppConfig> {
    if let Some(name) = &update.app_name {
        validate_text("appName", name, MAX_TITLE_LENGTH)?;
    }
    if let Some(Some(date)) = update.anniversary_date {
        validate_date("anniversaryDate", date)?;
    }
    if let Some(Some(url)) = &update.music_url {
        validate_url(url)?;
    }
    if let Some(zoom) = update.timeline_zoom {
        validate_zoom(zoom)?;
    }

    sqlx::query(
        r#"
        UPDATE app_config
        SET app_name = COALESCE(?, app_name),
            anniversary_date = CASE WHEN ? THEN ? ELSE anniversary_date END,
            proposal_accepted = COALESCE(?, proposal_accepted),
            music_url = CASE WHEN ? THEN ? ELSE music_url END,
            timeline_layout = COALESCE(?, timeline_layout),
            timeline_zoom = COALESCE(?, timeline_zoom),
            updated_at = ?
        WHERE id = 1
        "#,
    )
    .bind(update.app_name.as_deref().map(str::trim))
    .bind(update.anniversary_date.is_some())
    .bind(update.anniversary_date.flatten())
    .bind(update.proposal_accepted)
    .bind(update.music_url.is_some())
    .bind(update.music_url.clone().flatten())
    .bind(update.timeline_layout.map(|mode| mode.as_str()))
    .bind(update.timeline_zoom)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::info!("App configuration updated");

    get_config(pool).await
}
