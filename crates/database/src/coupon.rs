//! Love coupon lifecycle: created, redeemed once, optionally deleted.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Coupon, NewCoupon};
use crate::validation::{
    validate_amount, validate_color, validate_text, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH,
};
use crate::{begin_write, ledger, new_id, partner};

/// Create a new, unredeemed coupon.
pub async fn create_coupon(pool: &SqlitePool, new: &NewCoupon) -> Result<Coupon> {
    validate_text("title", &new.title, MAX_TITLE_LENGTH)?;
    if !new.description.trim().is_empty() {
        validate_text("desc", &new.description, MAX_TEXT_LENGTH)?;
    }
    validate_color(&new.color)?;
    validate_amount("points", new.points)?;

    // Surface a missing partner as NotFound rather than a foreign key failure.
    partner::get_partner(pool, &new.for_partner).await?;

    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO coupons (id, title, description, emoji, color, for_partner, points)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.title.trim())
    .bind(new.description.trim())
    .bind(new.emoji.trim())
    .bind(new.color.trim())
    .bind(&new.for_partner)
    .bind(new.points)
    .execute(pool)
    .await?;

    tracing::info!(id = %id, for_partner = %new.for_partner, "Coupon created");

    get_coupon(pool, &id).await
}

/// Get a coupon by ID.
pub async fn get_coupon(pool: &SqlitePool, id: &str) -> Result<Coupon> {
    sqlx::query_as::<_, Coupon>(
        r#"
        SELECT id, title, description, emoji, color, for_partner, points,
               is_redeemed, redeemed_at, created_at
        FROM coupons
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Coupon",
        id: id.to_string(),
    })
}

/// List all coupons, newest first.
pub async fn list_coupons(pool: &SqlitePool) -> Result<Vec<Coupon>> {
    let coupons = sqlx::query_as::<_, Coupon>(
        r#"
        SELECT id, title, description, emoji, color, for_partner, points,
               is_redeemed, redeemed_at, created_at
        FROM coupons
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(coupons)
}

/// Redeem a coupon, paying its price from the spendable points.
///
/// The price and the state change commit together or not at all.
pub async fn redeem_coupon(pool: &SqlitePool, id: &str, now: DateTime<Utc>) -> Result<Coupon> {
    let mut tx = begin_write(pool).await?;

    let (points, is_redeemed) = sqlx::query_as::<_, (i64, bool)>(
        r#"
        SELECT points, is_redeemed
        FROM coupons
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Coupon",
        id: id.to_string(),
    })?;

    if is_redeemed {
        return Err(DatabaseError::AlreadyRedeemed { id: id.to_string() });
    }

    ledger::debit(&mut tx, points).await?;

    sqlx::query(
        r#"
        UPDATE coupons
        SET is_redeemed = 1, redeemed_at = ?
        WHERE id = ? AND is_redeemed = 0
        "#,
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(id = %id, points, "Coupon redeemed");

    get_coupon(pool, id).await
}

/// Delete a coupon by ID.
pub async fn delete_coupon(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM coupons
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Coupon",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn new_coupon(points: i64) -> NewCoupon {
        NewCoupon {
            title: "Breakfast in bed".to_string(),
            description: "Pancakes included".to_string(),
            emoji: "🥞".to_string(),
            color: "#ffd6a5".to_string(),
            for_partner: "partner2".to_string(),
            points,
        }
    }

    #[tokio::test]
    async fn test_coupon_lifecycle() {
        let db = test_db().await;
        ledger::add_points(db.pool(), "partner1", 40).await.unwrap();

        let coupon = create_coupon(db.pool(), &new_coupon(30)).await.unwrap();
        assert!(!coupon.is_redeemed);
        assert!(coupon.redeemed_at.is_none());

        let redeemed = redeem_coupon(db.pool(), &coupon.id, Utc::now()).await.unwrap();
        assert!(redeemed.is_redeemed);
        assert!(redeemed.redeemed_at.is_some());

        let stats = ledger::get_stats(db.pool()).await.unwrap();
        assert_eq!(stats.total_points, 10);

        // One-way transition
        let again = redeem_coupon(db.pool(), &coupon.id, Utc::now()).await;
        assert!(matches!(again, Err(DatabaseError::AlreadyRedeemed { .. })));

        delete_coupon(db.pool(), &coupon.id).await.unwrap();
        assert!(list_coupons(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_without_points_keeps_coupon_open() {
        let db = test_db().await;
        let coupon = create_coupon(db.pool(), &new_coupon(50)).await.unwrap();

        let result = redeem_coupon(db.pool(), &coupon.id, Utc::now()).await;
        assert!(matches!(result, Err(DatabaseError::Ledger(_))));

        let coupon = get_coupon(db.pool(), &coupon.id).await.unwrap();
        assert!(!coupon.is_redeemed);
    }

    #[tokio::test]
    async fn test_free_coupon_and_missing_coupon() {
        let db = test_db().await;
        let coupon = create_coupon(db.pool(), &new_coupon(0)).await.unwrap();
        assert!(redeem_coupon(db.pool(), &coupon.id, Utc::now()).await.is_ok());

        let result = redeem_coupon(db.pool(), "missing", Utc::now()).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
        let result = delete_coupon(db.pool(), "missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let db = test_db().await;

        let mut bad = new_coupon(10);
        bad.color = "pink".to_string();
        let result = create_coupon(db.pool(), &bad).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));

        let mut bad = new_coupon(10);
        bad.for_partner = "someone".to_string();
        let result = create_coupon(db.pool(), &bad).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
