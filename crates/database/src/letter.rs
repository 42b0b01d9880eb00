//! Love letters and their arrival on the timeline.

use chrono::{DateTime, Utc};
use narinyland_core::{EventKind, MediaType, TimelineEvent, TimelineMedia};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{LoveLetter, NewLoveLetter};
use crate::validation::{
    validate_date, validate_text, validate_url, MAX_LETTER_LENGTH, MAX_TITLE_LENGTH,
};
use crate::{begin_write, new_id, partner, timeline};

/// Create a letter. Without `unlock_at` it unlocks at `now`.
pub async fn create_letter(
    pool: &SqlitePool,
    new: &NewLoveLetter,
    now: DateTime<Utc>,
) -> Result<LoveLetter> {
    validate_text("title", &new.title, MAX_TITLE_LENGTH)?;
    validate_text("content", &new.content, MAX_LETTER_LENGTH)?;
    if let Some(url) = &new.media_url {
        validate_url(url)?;
    }
    if let Some(unlock_at) = new.unlock_at {
        validate_date("unlockAt", unlock_at)?;
    }
    partner::get_partner(pool, &new.from_partner).await?;

    let letter = sqlx::query_as::<_, LoveLetter>(
        r#"
        INSERT INTO love_letters (id, from_partner, title, content, media_url, unlock_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, from_partner, title, content, media_url, unlock_at, delivered, created_at
        "#,
    )
    .bind(new_id())
    .bind(&new.from_partner)
    .bind(new.title.trim())
    .bind(new.content.trim())
    .bind(new.media_url.as_deref())
    .bind(new.unlock_at.unwrap_or(now))
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::info!(id = %letter.id, unlock_at = %letter.unlock_at, "Love letter sealed");
    Ok(letter)
}

/// List all letters by unlock time.
pub async fn list_letters(pool: &SqlitePool) -> Result<Vec<LoveLetter>> {
    let letters = sqlx::query_as::<_, LoveLetter>(
        r#"
        SELECT id, from_partner, title, content, media_url, unlock_at, delivered, created_at
        FROM love_letters
        ORDER BY unlock_at, rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(letters)
}

/// Delete a letter, returning it so attached media can be cleaned up.
pub async fn delete_letter(pool: &SqlitePool, id: &str) -> Result<LoveLetter> {
    sqlx::query_as::<_, LoveLetter>(
        r#"
        DELETE FROM love_letters
        WHERE id = ?
        RETURNING id, from_partner, title, content, media_url, unlock_at, delivered, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "LoveLetter",
        id: id.to_string(),
    })
}

/// Mark every unlocked, undelivered letter as delivered and put a `letter`
/// event on the timeline for each, at its unlock time.
///
/// Returns the letters delivered by this call.
pub async fn deliver_due_letters(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<LoveLetter>> {
    let mut tx = begin_write(pool).await?;

    let due = sqlx::query_as::<_, LoveLetter>(
        r#"
        SELECT id, from_partner, title, content, media_url, unlock_at, delivered, created_at
        FROM love_letters
        WHERE delivered = 0
        ORDER BY unlock_at, rowid
        "#,
    )
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .filter(|letter| letter.unlock_at <= now)
    .collect::<Vec<_>>();

    for letter in &due {
        sqlx::query(
            r#"
            UPDATE love_letters
            SET delivered = 1
            WHERE id = ?
            "#,
        )
        .bind(&letter.id)
        .execute(&mut *tx)
        .await?;

        let event = TimelineEvent {
            id: new_id(),
            text: format!("A love letter arrived: {}", letter.title),
            timestamp: letter.unlock_at,
            kind: EventKind::Letter,
            location: None,
            media: letter.media_url.clone().map(|url| TimelineMedia {
                media_type: MediaType::from_url(&url).unwrap_or(MediaType::Image),
                url,
            }),
        };
        timeline::insert_event(&mut tx, &event).await?;
    }

    tx.commit().await?;

    if !due.is_empty() {
        tracing::info!(count = due.len(), "Love letters delivered");
    }

    Ok(due
        .into_iter()
        .map(|letter| LoveLetter {
            delivered: true,
            ..letter
        })
        .collect())
}
