//! Points, XP, quests and leaves.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use database::{LoveStats, Partner, QuestLogEntry};
use narinyland_core::TimelineEvent;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::AppState;

/// XP awarded for a quest when the request names no amount.
const DEFAULT_QUEST_XP: i64 = 20;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub partner_id: String,
    pub amount: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRequest {
    pub partner_id: String,
    pub quest: String,
    #[serde(default)]
    pub xp: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpResponse {
    pub leveled_up: bool,
    pub level: i64,
    pub stats: LoveStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestResponse {
    pub leveled_up: bool,
    pub level: i64,
    pub quest: QuestLogEntry,
    pub event: TimelineEvent,
    pub stats: LoveStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafResponse {
    pub leaves: i64,
    pub cost: i64,
    pub stats: LoveStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub partner: Partner,
    pub stats: LoveStats,
}

/// Current level, points and leaves.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<LoveStats>> {
    Ok(Json(database::ledger::get_stats(state.db.pool()).await?))
}

/// Grant XP to a partner.
pub async fn add_xp(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<XpResponse>> {
    let Json(request) = payload?;
    let pool = state.db.pool();

    let outcome = database::ledger::add_xp(pool, &request.partner_id, request.amount).await?;

    Ok(Json(XpResponse {
        leveled_up: outcome.leveled_up,
        level: outcome.current.level,
        stats: database::ledger::get_stats(pool).await?,
    }))
}

/// Log a completed quest, grant its XP and put it on the timeline.
pub async fn complete_quest(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuestRequest>, JsonRejection>,
) -> Result<Json<QuestResponse>> {
    let Json(request) = payload?;
    let pool = state.db.pool();

    let done = database::quest::complete_quest(
        pool,
        &request.partner_id,
        &request.quest,
        request.xp.unwrap_or(DEFAULT_QUEST_XP),
        Utc::now(),
    )
    .await?;

    Ok(Json(QuestResponse {
        leveled_up: done.outcome.leveled_up,
        level: done.outcome.current.level,
        quest: done.entry,
        event: done.event,
        stats: database::ledger::get_stats(pool).await?,
    }))
}

/// Spend points to grow a leaf on the tree.
pub async fn add_leaf(State(state): State<AppState>) -> Result<Json<LeafResponse>> {
    let pool = state.db.pool();
    let cost = state.config.leaf_cost;

    let leaves = database::ledger::grow_leaf(pool, cost).await?;

    Ok(Json(LeafResponse {
        leaves,
        cost,
        stats: database::ledger::get_stats(pool).await?,
    }))
}

/// Credit spendable points without touching the level.
pub async fn add_points(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<PointsResponse>> {
    let Json(request) = payload?;
    let pool = state.db.pool();

    let partner = database::ledger::add_points(pool, &request.partner_id, request.amount).await?;

    Ok(Json(PointsResponse {
        partner,
        stats: database::ledger::get_stats(pool).await?,
    }))
}
