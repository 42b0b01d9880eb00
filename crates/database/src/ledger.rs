//! Points ledger and level cache.
//!
//! Lifetime points only ever grow and decide the level; spendable points are
//! drawn down by purchases. Every mutation runs in a write transaction and
//! uses in-place increments, so concurrent requests from both partners cannot
//! lose updates.

use narinyland_core::{
    apply_xp, calculate_level, plan_spend, total_lifetime, total_spendable, Deduction,
    LedgerError, LevelProgress, XpOutcome,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DatabaseError, Result};
use crate::models::{LoveStats, Partner};
use crate::validation::{validate_amount, validate_balance};
use crate::{begin_write, partner};

/// Grant XP to a partner: raises both spendable and lifetime points.
///
/// Returns the level transition computed from the combined lifetime total.
pub async fn add_xp(pool: &SqlitePool, partner_id: &str, amount: i64) -> Result<XpOutcome> {
    validate_amount("amount", amount)?;

    let mut tx = begin_write(pool).await?;
    let outcome = grant_xp(&mut tx, partner_id, amount).await?;
    tx.commit().await?;

    info!(
        partner = %partner_id,
        amount,
        level = outcome.current.level,
        leveled_up = outcome.leveled_up,
        "XP granted"
    );

    Ok(outcome)
}

/// Credit spendable points only. The level is unaffected.
pub async fn add_points(pool: &SqlitePool, partner_id: &str, amount: i64) -> Result<Partner> {
    validate_amount("amount", amount)?;

    let mut tx = begin_write(pool).await?;
    credit(&mut tx, partner_id, amount, 0).await?;
    tx.commit().await?;

    info!(partner = %partner_id, amount, "Points credited");

    partner::get_partner(pool, partner_id).await
}

/// Spend from the combined balance, richest partner first.
pub async fn spend_points(pool: &SqlitePool, cost: i64) -> Result<Vec<Deduction>> {
    let mut tx = begin_write(pool).await?;
    let deductions = debit(&mut tx, cost).await?;
    tx.commit().await?;

    info!(cost, deductions = deductions.len(), "Points spent");

    Ok(deductions)
}

/// Spend `cost` points to grow one leaf. Returns the new leaf count.
pub async fn grow_leaf(pool: &SqlitePool, cost: i64) -> Result<i64> {
    let mut tx = begin_write(pool).await?;
    debit(&mut tx, cost).await?;

    let leaves = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE love_stats
        SET leaves = leaves + 1
        WHERE id = 1
        RETURNING leaves
        "#,
    )
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(cost, leaves, "Leaf grown");
    Ok(leaves)
}

/// Current stats, with the level recomputed from lifetime points.
///
/// The stored level is only a cache; it is rewritten when it disagrees.
pub async fn get_stats(pool: &SqlitePool) -> Result<LoveStats> {
    let partners = partner::list_partners(pool).await?;
    let balances: Vec<_> = partners.iter().map(Partner::balance).collect();
    let total_lifetime_points = total_lifetime(&balances);
    let total_points = total_spendable(&balances);
    let progress = calculate_level(total_lifetime_points);

    let (cached_level, cached_xp, leaves) = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT level, xp, leaves
        FROM love_stats
        WHERE id = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    if cached_level != progress.level || cached_xp != total_lifetime_points {
        debug!(cached_level, level = progress.level, "Refreshing stale level cache");
        write_level_cache(pool, progress, total_lifetime_points).await?;
    }

    let quests_completed = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM quest_log
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(LoveStats {
        progress,
        total_lifetime_points,
        total_points,
        leaves,
        quests_completed,
        partners,
    })
}

/// Add XP inside an open transaction.
pub(crate) async fn grant_xp(
    conn: &mut SqliteConnection,
    partner_id: &str,
    amount: i64,
) -> Result<XpOutcome> {
    let before = lifetime_total(&mut *conn).await?;
    credit(&mut *conn, partner_id, amount, amount).await?;

    let outcome = apply_xp(before, amount);
    write_level_cache(&mut *conn, outcome.current, before.saturating_add(amount)).await?;

    Ok(outcome)
}

/// Take `cost` spendable points inside an open transaction.
pub(crate) async fn debit(conn: &mut SqliteConnection, cost: i64) -> Result<Vec<Deduction>> {
    let partners = sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, name, position, points, lifetime_points
        FROM partners
        ORDER BY position
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let balances: Vec<_> = partners.iter().map(Partner::balance).collect();
    let deductions = plan_spend(&balances, cost)?;

    for deduction in &deductions {
        let result = sqlx::query(
            r#"
            UPDATE partners
            SET points = points - ?
            WHERE id = ? AND points >= ?
            "#,
        )
        .bind(deduction.amount)
        .bind(&deduction.partner_id)
        .bind(deduction.amount)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            // Balance moved underneath the plan; the caller's transaction rolls back.
            return Err(LedgerError::InsufficientPoints {
                required: cost,
                available: total_spendable(&balances),
            }
            .into());
        }
    }

    Ok(deductions)
}

/// Raise a partner's counters, refusing to push either past `MAX_BALANCE`.
async fn credit(
    conn: &mut SqliteConnection,
    partner_id: &str,
    points: i64,
    lifetime_points: i64,
) -> Result<()> {
    let (current_points, current_lifetime) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT points, lifetime_points
        FROM partners
        WHERE id = ?
        "#,
    )
    .bind(partner_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Partner",
        id: partner_id.to_string(),
    })?;

    validate_balance("points", current_points.saturating_add(points))?;
    validate_balance("lifetimePoints", current_lifetime.saturating_add(lifetime_points))?;

    let result = sqlx::query(
        r#"
        UPDATE partners
        SET points = points + ?, lifetime_points = lifetime_points + ?
        WHERE id = ?
        "#,
    )
    .bind(points)
    .bind(lifetime_points)
    .bind(partner_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Partner",
            id: partner_id.to_string(),
        });
    }

    Ok(())
}

async fn lifetime_total(conn: &mut SqliteConnection) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(lifetime_points), 0) FROM partners
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}

async fn write_level_cache<'e, E>(executor: E, progress: LevelProgress, total: i64) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE love_stats
        SET level = ?, xp = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
        WHERE id = 1
        "#,
    )
    .bind(progress.level)
    .bind(total)
    .execute(executor)
    .await?;

    Ok(())
}
