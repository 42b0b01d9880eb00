//! Quest completion log.

use chrono::{DateTime, Utc};
use narinyland_core::{EventKind, TimelineEvent, XpOutcome};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::QuestLogEntry;
use crate::validation::{validate_amount, validate_text, MAX_TITLE_LENGTH};
use crate::{begin_write, ledger, new_id, timeline};

/// Everything a quest completion produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub entry: QuestLogEntry,
    pub outcome: XpOutcome,
    pub event: TimelineEvent,
}

/// Log a quest, grant its XP and record it on the timeline, atomically.
pub async fn complete_quest(
    pool: &SqlitePool,
    partner_id: &str,
    quest: &str,
    xp: i64,
    now: DateTime<Utc>,
) -> Result<QuestCompletion> {
    validate_text("quest", quest, MAX_TITLE_LENGTH)?;
    validate_amount("xp", xp)?;
    let quest = quest.trim();

    let mut tx = begin_write(pool).await?;

    let outcome = ledger::grant_xp(&mut tx, partner_id, xp).await?;

    let entry = sqlx::query_as::<_, QuestLogEntry>(
        r#"
        INSERT INTO quest_log (partner_id, quest, xp, completed_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, partner_id, quest, xp, completed_at
        "#,
    )
    .bind(partner_id)
    .bind(quest)
    .bind(xp)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let event = TimelineEvent {
        id: new_id(),
        text: format!("Quest completed: {}", quest),
        timestamp: now,
        kind: EventKind::Quest,
        location: None,
        media: None,
    };
    timeline::insert_event(&mut tx, &event).await?;

    tx.commit().await?;

    tracing::info!(
        partner = %partner_id,
        quest = %quest,
        xp,
        leveled_up = outcome.leveled_up,
        "Quest completed"
    );

    Ok(QuestCompletion {
        entry,
        outcome,
        event,
    })
}

/// Most recent quest completions first.
pub async fn list_quests(pool: &SqlitePool, limit: i64) -> Result<Vec<QuestLogEntry>> {
    let rows = sqlx::query_as::<_, QuestLogEntry>(
        r#"
        SELECT id, partner_id, quest, xp, completed_at
        FROM quest_log
        ORDER BY completed_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use crate::DatabaseError;

    #[tokio::test]
    async fn test_complete_quest() {
        let db = test_db().await;

        let done = complete_quest(db.pool(), "partner2", "Cook dinner together", 120, Utc::now())
            .await
            .unwrap();
        assert!(done.outcome.leveled_up);
        assert_eq!(done.entry.quest, "Cook dinner together");
        assert_eq!(done.event.kind, EventKind::Quest);

        let stats = ledger::get_stats(db.pool()).await.unwrap();
        assert_eq!(stats.quests_completed, 1);
        assert_eq!(stats.progress.level, 2);

        let events = timeline::list_events(db.pool()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, done.event.id);

        let quests = list_quests(db.pool(), 10).await.unwrap();
        assert_eq!(quests.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_quest_leaves_no_trace() {
        let db = test_db().await;

        let result = complete_quest(db.pool(), "nobody", "Walk", 10, Utc::now()).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        assert!(list_quests(db.pool(), 10).await.unwrap().is_empty());
        assert!(timeline::list_events(db.pool()).await.unwrap().is_empty());
    }
}
