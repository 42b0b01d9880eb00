//! Pure computations behind Narinyland.
//!
//! Nothing in this crate touches storage or the network. It provides:
//!
//! - [`level`] - mapping lifetime points to a level and in-level progress
//! - [`ledger`] - planning how a spend is split between the two partners
//! - [`timeline`] - anniversary synthesis, chronological merge and layout
//! - [`gallery`] - privacy filtering and the carousel cursor
//!
//! # Example
//!
//! ```rust
//! use narinyland_core::level::calculate_level;
//!
//! let progress = calculate_level(250);
//! assert_eq!(progress.level, 3);
//! assert_eq!(progress.xp_in_level, 50);
//! ```

pub mod error;
pub mod gallery;
pub mod ledger;
pub mod level;
pub mod timeline;

pub use error::{LedgerError, ParseError};
pub use gallery::{filter_memories, Carousel, GalleryView, MemoryItem, Privacy};
pub use ledger::{plan_spend, total_lifetime, total_spendable, Deduction, PartnerBalance};
pub use level::{apply_xp, calculate_level, LevelProgress, XpOutcome};
pub use timeline::{
    layout, merge, AnniversaryMarker, EventKind, LayoutMode, LayoutParams, MediaType,
    TimelineEntry, TimelineEvent, TimelineLayout, TimelineMedia,
};
