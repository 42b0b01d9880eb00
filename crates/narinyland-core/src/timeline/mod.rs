//! Timeline events, anniversary synthesis and chronological merge.
//!
//! Stored events and synthetic anniversary markers are combined into a single
//! list of [`TimelineEntry`] values, sorted once by timestamp, and then handed
//! to one of the [`layout`] functions.

pub mod anniversary;
pub mod layout;
pub mod path;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub use anniversary::{anniversaries, ordinal, AnniversaryMarker};
pub use layout::{layout, LayoutMode, LayoutNode, LayoutParams, Side, TimelineLayout};
pub use path::{to_svg_path, PathCommand, Point};

/// What produced a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Pet,
    System,
    Letter,
    Quest,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Pet => "pet",
            EventKind::System => "system",
            EventKind::Letter => "letter",
            EventKind::Quest => "quest",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pet" => Ok(EventKind::Pet),
            "system" => Ok(EventKind::System),
            "letter" => Ok(EventKind::Letter),
            "quest" => Ok(EventKind::Quest),
            _ => Err(ParseError::new("event kind", s)),
        }
    }
}

/// Kind of media attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    /// Guess the media type from a MIME content type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let major = content_type.split('/').next()?.trim().to_ascii_lowercase();
        match major.as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }

    /// Guess the media type from the file extension of a URL or key.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next()?;
        let file = path.rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;

        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "avif" | "heic" | "heif" | "bmp" | "svg" => {
                Some(MediaType::Image)
            }
            "mp4" | "m4v" | "mov" | "webm" | "mkv" | "avi" | "ogv" => Some(MediaType::Video),
            "mp3" | "m4a" | "aac" | "wav" | "flac" | "ogg" | "oga" | "opus" => {
                Some(MediaType::Audio)
            }
            _ => None,
        }
    }
}

impl FromStr for MediaType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            _ => Err(ParseError::new("media type", s)),
        }
    }
}

/// Media attached to a timeline event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineMedia {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

/// A user-authored or action-generated timeline event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<TimelineMedia>,
}

/// One renderable item: either a stored event or a synthesized marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum TimelineEntry {
    Real(TimelineEvent),
    Anniversary(AnniversaryMarker),
}

impl TimelineEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Real(event) => event.timestamp,
            TimelineEntry::Anniversary(marker) => marker.timestamp,
        }
    }

    /// Stable key for rendering. Anniversary keys are derived from the year index.
    pub fn key(&self) -> String {
        match self {
            TimelineEntry::Real(event) => event.id.clone(),
            TimelineEntry::Anniversary(marker) => format!("anniversary-{}", marker.year),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TimelineEntry::Real(event) => &event.text,
            TimelineEntry::Anniversary(marker) => &marker.label,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, TimelineEntry::Anniversary(_))
    }
}

/// Merge stored events with anniversary markers and sort by time.
///
/// Real events come first in the input, then markers, and the sort is stable,
/// so an event sharing a timestamp with a marker is listed before it.
pub fn merge(
    events: Vec<TimelineEvent>,
    anniversary_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = events.into_iter().map(TimelineEntry::Real).collect();

    if let Some(start) = anniversary_start {
        entries.extend(
            anniversaries(start, now)
                .into_iter()
                .map(TimelineEntry::Anniversary),
        );
    }

    entries.sort_by_key(|entry| entry.timestamp());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, y: i32, m: u32, d: u32) -> TimelineEvent {
        TimelineEvent {
            id: id.to_string(),
            text: format!("event {}", id),
            timestamp: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            kind: EventKind::System,
            location: None,
            media: None,
        }
    }

    #[test]
    fn test_merge_sorts_events_and_markers() {
        let start = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
        let events = vec![event("late", 2022, 12, 25), event("early", 2021, 7, 4)];

        let merged = merge(events, Some(start), now);
        let keys: Vec<String> = merged.iter().map(|e| e.key()).collect();

        assert_eq!(
            keys,
            vec![
                "anniversary-0",
                "early",
                "anniversary-1",
                "late",
                "anniversary-2"
            ]
        );
        assert_eq!(merged[0].text(), "The Beginning of Us");
        assert!(merged[0].is_synthetic());
    }

    #[test]
    fn test_merge_is_deterministic() {
        let start = Utc.with_ymd_and_hms(2020, 2, 14, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = vec![
            event("a", 2021, 2, 14),
            event("b", 2021, 2, 14),
            event("c", 2020, 5, 1),
        ];

        let first = merge(events.clone(), Some(start), now);
        let second = merge(events, Some(start), now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = vec![event("x", 2022, 1, 1), event("y", 2022, 1, 1)];

        let merged = merge(events, None, now);
        assert_eq!(merged[0].key(), "x");
        assert_eq!(merged[1].key(), "y");
    }

    #[test]
    fn test_merge_without_anniversary_or_events_is_empty() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(merge(Vec::new(), None, now).is_empty());
    }

    #[test]
    fn test_entry_serializes_with_variant_tag() {
        let entry = TimelineEntry::Real(event("a", 2022, 1, 1));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["variant"], "real");
        assert_eq!(json["type"], "system");
        assert_eq!(json["id"], "a");
    }

    #[test]
    fn test_event_kind_parse() {
        assert_eq!("Quest".parse::<EventKind>().unwrap(), EventKind::Quest);
        assert!("party".parse::<EventKind>().is_err());
        assert_eq!(
            MediaType::from_content_type("video/mp4"),
            Some(MediaType::Video)
        );
        assert_eq!(MediaType::from_content_type("application/pdf"), None);
    }

    #[test]
    fn test_media_type_from_url() {
        assert_eq!(
            MediaType::from_url("/media/letters/voice.MP3"),
            Some(MediaType::Audio)
        );
        assert_eq!(
            MediaType::from_url("https://cdn.example.com/v/clip.webm?t=3#start"),
            Some(MediaType::Video)
        );
        assert_eq!(
            MediaType::from_url("/media/memories/beach.jpeg"),
            Some(MediaType::Image)
        );
        assert_eq!(MediaType::from_url("https://example.com/notes.pdf"), None);
        assert_eq!(MediaType::from_url("https://example.com/v1.2/photo"), None);
    }
}
