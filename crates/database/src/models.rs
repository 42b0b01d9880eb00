//! Database models.

use chrono::{DateTime, Utc};
use narinyland_core::{
    EventKind, LayoutMode, LevelProgress, MediaType, MemoryItem, PartnerBalance, Privacy,
    TimelineEvent, TimelineMedia,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{DatabaseError, Result};

/// Shared configuration of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    /// Start date for anniversary markers.
    pub anniversary_date: Option<DateTime<Utc>>,
    pub proposal_accepted: bool,
    pub music_url: Option<String>,
    pub timeline_layout: LayoutMode,
    pub timeline_zoom: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct AppConfigRow {
    pub app_name: String,
    pub anniversary_date: Option<DateTime<Utc>>,
    pub proposal_accepted: bool,
    pub music_url: Option<String>,
    pub timeline_layout: String,
    pub timeline_zoom: f64,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AppConfigRow> for AppConfig {
    type Error = DatabaseError;

    fn try_from(row: AppConfigRow) -> Result<Self> {
        let timeline_layout = row.timeline_layout.parse().map_err(|e| corrupt("AppConfig", e))?;

        Ok(Self {
            app_name: row.app_name,
            anniversary_date: row.anniversary_date,
            proposal_accepted: row.proposal_accepted,
            music_url: row.music_url,
            timeline_layout,
            timeline_zoom: row.timeline_zoom,
            updated_at: row.updated_at,
        })
    }
}

/// Partial update of [`AppConfig`]. `None` leaves a field unchanged.
///
/// The optional settings take `Some(None)` to clear them; in JSON that is an
/// explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub app_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[allow(clippy::option_option)]
    pub anniversary_date: Option<Option<DateTime<Utc>>>,
    pub proposal_accepted: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[allow(clippy::option_option)]
    pub music_url: Option<Option<String>>,
    pub timeline_layout: Option<LayoutMode>,
    pub timeline_zoom: Option<f64>,
}

/// A present field, `null` included, becomes `Some`; `default` covers absence.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// One half of the couple, with their points ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub position: i64,
    /// Spendable balance.
    pub points: i64,
    /// Cumulative XP; never decreases.
    pub lifetime_points: i64,
}

impl Partner {
    pub fn balance(&self) -> PartnerBalance {
        PartnerBalance {
            partner_id: self.id.clone(),
            points: self.points,
            lifetime_points: self.lifetime_points,
        }
    }
}

/// Level state derived from both partners' lifetime points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoveStats {
    #[serde(flatten)]
    pub progress: LevelProgress,
    pub total_lifetime_points: i64,
    pub total_points: i64,
    pub leaves: i64,
    pub quests_completed: i64,
    pub partners: Vec<Partner>,
}

/// A gallery row.
#[derive(Debug, FromRow)]
pub(crate) struct MemoryRow {
    pub id: String,
    pub url: String,
    pub privacy: String,
    pub caption: Option<String>,
}

impl TryFrom<MemoryRow> for MemoryItem {
    type Error = DatabaseError;

    fn try_from(row: MemoryRow) -> Result<Self> {
        let privacy: Privacy = row.privacy.parse().map_err(|e| corrupt("Memory", e))?;
        Ok(MemoryItem {
            id: row.id,
            url: row.url,
            privacy,
            caption: row.caption,
        })
    }
}

/// A gallery item to store. Without an `id` one is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMemory {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, FromRow)]
pub(crate) struct TimelineEventRow {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub location: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
}

impl TryFrom<TimelineEventRow> for TimelineEvent {
    type Error = DatabaseError;

    fn try_from(row: TimelineEventRow) -> Result<Self> {
        let kind: EventKind = row.kind.parse().map_err(|e| corrupt("TimelineEvent", e))?;
        let media = match (row.media_url, row.media_type) {
            (Some(url), Some(media_type)) => Some(TimelineMedia {
                url,
                media_type: media_type
                    .parse::<MediaType>()
                    .map_err(|e| corrupt("TimelineEvent", e))?,
            }),
            (Some(url), None) => Some(TimelineMedia {
                url,
                media_type: MediaType::Image,
            }),
            _ => None,
        };

        Ok(TimelineEvent {
            id: row.id,
            text: row.text,
            timestamp: row.timestamp,
            kind,
            location: row.location,
            media,
        })
    }
}

/// A timeline event to create. Missing timestamp means now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimelineEvent {
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", default = "default_event_kind")]
    pub kind: EventKind,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub media: Option<TimelineMedia>,
}

fn default_event_kind() -> EventKind {
    EventKind::System
}

/// Partial update of a timeline event. Identity and kind are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEventUpdate {
    pub text: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub media: Option<TimelineMedia>,
}

/// A redeemable love coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub emoji: String,
    pub color: String,
    pub for_partner: String,
    /// Spendable points consumed on redemption.
    pub points: i64,
    pub is_redeemed: bool,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default = "default_coupon_color")]
    pub color: String,
    pub for_partner: String,
    #[serde(default)]
    pub points: i64,
}

fn default_coupon_color() -> String {
    "#ff8fab".to_string()
}

/// A letter that unlocks at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LoveLetter {
    pub id: String,
    pub from_partner: String,
    pub title: String,
    pub content: String,
    pub media_url: Option<String>,
    pub unlock_at: DateTime<Utc>,
    /// Set once the letter has arrived on the timeline.
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoveLetter {
    pub from_partner: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub media_url: Option<String>,
    /// Missing means the letter arrives immediately.
    #[serde(default)]
    pub unlock_at: Option<DateTime<Utc>>,
}

/// A completed quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestLogEntry {
    pub id: i64,
    pub partner_id: String,
    pub quest: String,
    pub xp: i64,
    pub completed_at: DateTime<Utc>,
}

fn corrupt(entity: &'static str, err: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Corrupt {
        entity,
        detail: err.to_string(),
    }
}
