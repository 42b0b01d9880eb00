//! Gallery privacy filtering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            _ => Err(ParseError::new("privacy", s)),
        }
    }
}

/// Which memories the gallery shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryView {
    #[default]
    All,
    Public,
    Private,
}

impl GalleryView {
    pub fn admits(&self, privacy: Privacy) -> bool {
        match self {
            GalleryView::All => true,
            GalleryView::Public => privacy == Privacy::Public,
            GalleryView::Private => privacy == Privacy::Private,
        }
    }
}

impl FromStr for GalleryView {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(GalleryView::All),
            "public" => Ok(GalleryView::Public),
            "private" => Ok(GalleryView::Private),
            _ => Err(ParseError::new("gallery view", s)),
        }
    }
}

/// A photo or video in the shared gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    pub url: String,
    pub privacy: Privacy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Items visible in `view`, in their original order.
pub fn filter_memories(items: &[MemoryItem], view: GalleryView) -> Vec<MemoryItem> {
    items
        .iter()
        .filter(|item| view.admits(item.privacy))
        .cloned()
        .collect()
}

/// Position within the filtered gallery.
///
/// Changing the view resets the position; cycling wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carousel {
    view: GalleryView,
    index: usize,
}

impl Carousel {
    pub fn new(view: GalleryView) -> Self {
        Self { view, index: 0 }
    }

    pub fn view(&self) -> GalleryView {
        self.view
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_view(&mut self, view: GalleryView) {
        if view != self.view {
            self.view = view;
            self.index = 0;
        }
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else {
            self.index = (self.index + 1) % len;
        }
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else {
            self.index = (self.index % len + len - 1) % len;
        }
    }

    /// The selected item among `items` filtered by the current view.
    pub fn current<'a>(&self, items: &'a [MemoryItem]) -> Option<&'a MemoryItem> {
        let visible: Vec<&MemoryItem> = items
            .iter()
            .filter(|item| self.view.admits(item.privacy))
            .collect();
        if visible.is_empty() {
            return None;
        }
        visible.get(self.index % visible.len()).copied()
    }
}
