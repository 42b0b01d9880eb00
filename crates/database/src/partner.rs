//! Partner records.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Partner;
use crate::validation::{validate_text, MAX_TITLE_LENGTH};

/// List both partners in display order.
pub async fn list_partners(pool: &SqlitePool) -> Result<Vec<Partner>> {
    let partners = sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, name, position, points, lifetime_points
        FROM partners
        ORDER BY position
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(partners)
}

/// Get a partner by ID.
pub async fn get_partner(pool: &SqlitePool, id: &str) -> Result<Partner> {
    sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, name, position, points, lifetime_points
        FROM partners
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Partner",
        id: id.to_string(),
    })
}

/// Change a partner's display name.
pub async fn rename_partner(pool: &SqlitePool, id: &str, name: &str) -> Result<()> {
    validate_text("name", name, MAX_TITLE_LENGTH)?;

    let result = sqlx::query(
        r#"
        UPDATE partners
        SET name = ?
        WHERE id = ?
        "#,
    )
    .bind(name.trim())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Partner",
            id: id.to_string(),
        });
    }

    Ok(())
}
