//! Timeline event CRUD operations.

use chrono::Utc;
use narinyland_core::TimelineEvent;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{NewTimelineEvent, TimelineEventRow, TimelineEventUpdate};
use crate::new_id;
use crate::validation::{
    validate_date, validate_text, validate_url, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH,
};

/// Create a new event.
pub async fn create_event(pool: &SqlitePool, new: &NewTimelineEvent) -> Result<TimelineEvent> {
    validate_text("text", &new.text, MAX_TEXT_LENGTH)?;
    if let Some(location) = &new.location {
        validate_text("location", location, MAX_TITLE_LENGTH)?;
    }
    if let Some(media) = &new.media {
        validate_url(&media.url)?;
    }
    if let Some(timestamp) = new.timestamp {
        validate_date("timestamp", timestamp)?;
    }

    let event = TimelineEvent {
        id: new_id(),
        text: new.text.trim().to_string(),
        timestamp: new.timestamp.unwrap_or_else(Utc::now),
        kind: new.kind,
        location: new.location.clone(),
        media: new.media.clone(),
    };

    let mut conn = pool.acquire().await?;
    insert_event(&mut conn, &event).await?;

    tracing::info!(id = %event.id, kind = %event.kind, "Timeline event created");
    Ok(event)
}

/// Get an event by ID.
pub async fn get_event(pool: &SqlitePool, id: &str) -> Result<TimelineEvent> {
    sqlx::query_as::<_, TimelineEventRow>(
        r#"
        SELECT id, text, timestamp, kind, location, media_url, media_type
        FROM timeline_events
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "TimelineEvent",
        id: id.to_string(),
    })?
    .try_into()
}

/// List all events, oldest first.
pub async fn list_events(pool: &SqlitePool) -> Result<Vec<TimelineEvent>> {
    let rows = sqlx::query_as::<_, TimelineEventRow>(
        r#"
        SELECT id, text, timestamp, kind, location, media_url, media_type
        FROM timeline_events
        ORDER BY timestamp, rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut events = rows
        .into_iter()
        .map(TimelineEvent::try_from)
        .collect::<Result<Vec<_>>>()?;

    // Text ordering can disagree with time ordering across offsets.
    events.sort_by_key(|event| event.timestamp);
    Ok(events)
}

/// Apply a partial update and return the updated event.
pub async fn update_event(
    pool: &SqlitePool,
    id: &str,
    update: &TimelineEventUpdate,
) -> Result<TimelineEvent> {
    if let Some(text) = &update.text {
        validate_text("text", text, MAX_TEXT_LENGTH)?;
    }
    if let Some(location) = &update.location {
        validate_text("location", location, MAX_TITLE_LENGTH)?;
    }
    if let Some(media) = &update.media {
        validate_url(&media.url)?;
    }
    if let Some(timestamp) = update.timestamp {
        validate_date("timestamp", timestamp)?;
    }

    let result = sqlx::query(
        r#"
        UPDATE timeline_events
        SET text = COALESCE(?, text),
            timestamp = COALESCE(?, timestamp),
            location = COALESCE(?, location),
            media_url = COALESCE(?, media_url),
            media_type = COALESCE(?, media_type)
        WHERE id = ?
        "#,
    )
    .bind(update.text.as_deref().map(str::trim))
    .bind(update.timestamp)
    .bind(update.location.as_deref())
    .bind(update.media.as_ref().map(|m| m.url.as_str()))
    .bind(update.media.as_ref().map(|m| m.media_type.as_str()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "TimelineEvent",
            id: id.to_string(),
        });
    }

    get_event(pool, id).await
}

/// Delete an event, returning it so attached media can be cleaned up.
pub async fn delete_event(pool: &SqlitePool, id: &str) -> Result<TimelineEvent> {
    let row = sqlx::query_as::<_, TimelineEventRow>(
        r#"
        DELETE FROM timeline_events
        WHERE id = ?
        RETURNING id, text, timestamp, kind, location, media_url, media_type
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "TimelineEvent",
        id: id.to_string(),
    })?;

    tracing::info!(id = %id, "Timeline event deleted");
    row.try_into()
}

/// Insert a fully formed event on an existing connection or transaction.
pub(crate) async fn insert_event(conn: &mut SqliteConnection, event: &TimelineEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO timeline_events (id, text, timestamp, kind, location, media_url, media_type)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.text)
    .bind(event.timestamp)
    .bind(event.kind.as_str())
    .bind(event.location.as_deref())
    .bind(event.media.as_ref().map(|m| m.url.as_str()))
    .bind(event.media.as_ref().map(|m| m.media_type.as_str()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}
