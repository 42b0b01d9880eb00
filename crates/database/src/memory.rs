//! Gallery memories: a flat, ordered list.

use std::collections::HashSet;

use narinyland_core::MemoryItem;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{MemoryRow, NewMemory};
use crate::new_id;
use crate::validation::{validate_text, validate_url, MAX_TEXT_LENGTH};

/// List all memories in gallery order.
pub async fn list_memories(pool: &SqlitePool) -> Result<Vec<MemoryItem>> {
    let rows = sqlx::query_as::<_, MemoryRow>(
        r#"
        SELECT id, url, privacy, caption
        FROM memories
        ORDER BY position, created_at
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MemoryItem::try_from).collect()
}

/// Append a memory to the end of the gallery.
pub async fn add_memory(pool: &SqlitePool, new: &NewMemory) -> Result<MemoryItem> {
    validate_memory(new)?;

    let mut tx = pool.begin().await?;
    let position = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(MAX(position) + 1, 0) FROM memories
        "#,
    )
    .fetch_one(&mut *tx)
    .await?;

    let item = insert_memory(&mut tx, new, position).await?;
    tx.commit().await?;

    tracing::info!(id = %item.id, privacy = %item.privacy, "Memory added");
    Ok(item)
}

/// Remove a memory, returning it so its object can be deleted.
pub async fn delete_memory(pool: &SqlitePool, id: &str) -> Result<MemoryItem> {
    let row = sqlx::query_as::<_, MemoryRow>(
        r#"
        DELETE FROM memories
        WHERE id = ?
        RETURNING id, url, privacy, caption
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Memory",
        id: id.to_string(),
    })?;

    tracing::info!(id = %id, "Memory deleted");
    row.try_into()
}

/// Replace the whole gallery with `items`, in order.
///
/// Returns the previous memories whose URL no longer appears.
pub async fn replace_memories(pool: &SqlitePool, items: &[NewMemory]) -> Result<Vec<MemoryItem>> {
    for item in items {
        validate_memory(item)?;
    }

    let mut tx = pool.begin().await?;

    let previous = sqlx::query_as::<_, MemoryRow>(
        r#"
        SELECT id, url, privacy, caption
        FROM memories
        ORDER BY position, created_at
        "#,
    )
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(MemoryItem::try_from)
    .collect::<Result<Vec<_>>>()?;

    sqlx::query("DELETE FROM memories").execute(&mut *tx).await?;

    for (position, item) in items.iter().enumerate() {
        insert_memory(&mut tx, item, position as i64).await?;
    }

    tx.commit().await?;

    let kept: HashSet<&str> = items.iter().map(|item| item.url.trim()).collect();
    let removed: Vec<MemoryItem> = previous
        .into_iter()
        .filter(|item| !kept.contains(item.url.as_str()))
        .collect();

    tracing::info!(count = items.len(), removed = removed.len(), "Gallery replaced");
    Ok(removed)
}

fn validate_memory(new: &NewMemory) -> Result<()> {
    validate_url(&new.url)?;
    if let Some(caption) = &new.caption {
        validate_text("caption", caption, MAX_TEXT_LENGTH)?;
    }
    Ok(())
}

async fn insert_memory(
    conn: &mut SqliteConnection,
    new: &NewMemory,
    position: i64,
) -> Result<MemoryItem> {
    let item = MemoryItem {
        id: new.id.clone().unwrap_or_else(new_id),
        url: new.url.trim().to_string(),
        privacy: new.privacy,
        caption: new.caption.clone(),
    };

    sqlx::query(
        r#"
        INSERT INTO memories (id, url, privacy, caption, position)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.url)
    .bind(item.privacy.as_str())
    .bind(item.caption.as_deref())
    .bind(position)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Memory",
                    id: item.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use narinyland_core::Privacy;

    fn new_memory(url: &str, privacy: Privacy) -> NewMemory {
        NewMemory {
            id: None,
            url: url.to_string(),
            privacy,
            caption: None,
        }
    }

    #[tokio::test]
    async fn test_add_list_delete() {
        let db = test_db().await;

        let a = add_memory(db.pool(), &new_memory("/media/memories/a.jpg", Privacy::Public))
            .await
            .unwrap();
        add_memory(db.pool(), &new_memory("/media/memories/b.jpg", Privacy::Private))
            .await
            .unwrap();

        let items = list_memories(db.pool()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "/media/memories/a.jpg");
        assert_eq!(items[1].privacy, Privacy::Private);

        let deleted = delete_memory(db.pool(), &a.id).await.unwrap();
        assert_eq!(deleted.url, "/media/memories/a.jpg");
        assert_eq!(list_memories(db.pool()).await.unwrap().len(), 1);

        let result = delete_memory(db.pool(), &a.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_replace_reports_removed() {
        let db = test_db().await;
        add_memory(db.pool(), &new_memory("/media/memories/a.jpg", Privacy::Public))
            .await
            .unwrap();
        add_memory(db.pool(), &new_memory("/media/memories/b.jpg", Privacy::Public))
            .await
            .unwrap();

        let next = vec![
            new_memory("https://example.com/c.jpg", Privacy::Private),
            new_memory("/media/memories/b.jpg", Privacy::Public),
        ];
        let removed = replace_memories(db.pool(), &next).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].url, "/media/memories/a.jpg");

        let items = list_memories(db.pool()).await.unwrap();
        let urls: Vec<&str> = items.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/c.jpg", "/media/memories/b.jpg"]);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let db = test_db().await;
        let result = add_memory(db.pool(), &new_memory("not a url", Privacy::Public)).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }
}
