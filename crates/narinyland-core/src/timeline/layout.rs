//! Geometric arrangement of timeline entries.
//!
//! Three modes are supported:
//!
//! - [`LayoutMode::Vertical`]: fixed spacing per item, alternating sides.
//! - [`LayoutMode::Wave`]: y is proportional to elapsed time, x follows a sine
//!   curve of y. Crowded neighbours are nudged sideways.
//! - [`LayoutMode::Snake`]: one row per calendar year, alternating direction,
//!   with x as the fraction of the year elapsed.
//!
//! All functions are pure in `(entries, params)`. Entries must already be
//! sorted by timestamp (see [`super::merge`]).

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::path::{to_svg_path, PathCommand, Point};
use super::TimelineEntry;
use crate::error::ParseError;

pub const TOP_PADDING: f64 = 80.0;
pub const BOTTOM_PADDING: f64 = 80.0;
pub const MIN_CONTAINER_WIDTH: f64 = 320.0;

pub const VERTICAL_SPACING: f64 = 160.0;
pub const VERTICAL_OFFSET: f64 = 120.0;

pub const BASE_PIXELS_PER_YEAR: f64 = 600.0;
pub const WAVE_WAVELENGTH: f64 = 480.0;
pub const WAVE_MAX_AMPLITUDE: f64 = 160.0;
pub const WAVE_SIDE_MARGIN: f64 = 80.0;
/// Vertical gap below which a wave node is nudged sideways.
pub const MIN_EVENT_GAP: f64 = 60.0;
pub const JITTER: f64 = 70.0;
/// Sampling interval for the wave polyline.
pub const PATH_STEP: f64 = 12.0;
/// Upper bound on wave polyline segments; long spans sample more coarsely.
pub const MAX_PATH_SAMPLES: usize = 4096;

pub const SNAKE_ROW_HEIGHT: f64 = 220.0;
pub const SNAKE_MARGIN: f64 = 60.0;

const MILLIS_PER_YEAR: f64 = 365.2425 * 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Vertical,
    Wave,
    Snake,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Vertical => "vertical",
            LayoutMode::Wave => "wave",
            LayoutMode::Snake => "snake",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" => Ok(LayoutMode::Vertical),
            "wave" => Ok(LayoutMode::Wave),
            "snake" => Ok(LayoutMode::Snake),
            _ => Err(ParseError::new("layout mode", s)),
        }
    }
}

/// Inputs besides the entries themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub zoom: f64,
    pub container_width: f64,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Position of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub key: String,
    pub index: usize,
    pub position: Point,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    pub mode: LayoutMode,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    pub path: Vec<PathCommand>,
    pub now_marker: Option<Point>,
}

impl TimelineLayout {
    fn empty(mode: LayoutMode, width: f64) -> Self {
        Self {
            mode,
            width,
            height: 0.0,
            nodes: Vec::new(),
            path: Vec::new(),
            now_marker: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn svg_path(&self) -> String {
        to_svg_path(&self.path)
    }
}

/// Normalized geometry shared by the mode functions.
#[derive(Debug, Clone, Copy)]
struct Frame {
    zoom: f64,
    width: f64,
    center: f64,
    now: DateTime<Utc>,
}

impl Frame {
    fn new(params: &LayoutParams) -> Self {
        let zoom = if params.zoom.is_finite() && params.zoom > 0.0 {
            params.zoom
        } else {
            1.0
        };
        let width = if params.container_width.is_finite() {
            params.container_width.max(MIN_CONTAINER_WIDTH)
        } else {
            MIN_CONTAINER_WIDTH
        };

        Self {
            zoom,
            width,
            center: width / 2.0,
            now: params.now,
        }
    }

    fn side_of(&self, x: f64) -> Side {
        if x < self.center {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// Lay out sorted entries in the given mode.
pub fn layout(mode: LayoutMode, entries: &[TimelineEntry], params: &LayoutParams) -> TimelineLayout {
    let frame = Frame::new(params);
    if entries.is_empty() {
        return TimelineLayout::empty(mode, frame.width);
    }

    match mode {
        LayoutMode::Vertical => vertical(entries, &frame),
        LayoutMode::Wave => wave(entries, &frame),
        LayoutMode::Snake => snake(entries, &frame),
    }
}

fn years_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_YEAR
}

fn vertical(entries: &[TimelineEntry], frame: &Frame) -> TimelineLayout {
    let spacing = VERTICAL_SPACING * frame.zoom;
    let y_at = |index: f64| TOP_PADDING + index * spacing;

    let nodes: Vec<LayoutNode> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let side = if index % 2 == 0 { Side::Left } else { Side::Right };
            let x = match side {
                Side::Left => frame.center - VERTICAL_OFFSET,
                Side::Right => frame.center + VERTICAL_OFFSET,
            };
            LayoutNode {
                key: entry.key(),
                index,
                position: Point::new(x, y_at(index as f64)),
                side,
            }
        })
        .collect();

    let last_y = y_at((entries.len() - 1) as f64);
    let path = vec![
        PathCommand::MoveTo {
            to: Point::new(frame.center, TOP_PADDING),
        },
        PathCommand::LineTo {
            to: Point::new(frame.center, last_y),
        },
    ];

    let now_marker =
        fractional_index(entries, frame.now).map(|index| Point::new(frame.center, y_at(index)));

    TimelineLayout {
        mode: LayoutMode::Vertical,
        width: frame.width,
        height: last_y + BOTTOM_PADDING,
        nodes,
        path,
        now_marker,
    }
}

/// Position of `now` between neighbouring entries, as a fractional index.
fn fractional_index(entries: &[TimelineEntry], now: DateTime<Utc>) -> Option<f64> {
    let first = entries.first()?.timestamp();
    let last = entries.last()?.timestamp();
    if now < first || now > last {
        return None;
    }

    for (index, pair) in entries.windows(2).enumerate() {
        let (start, end) = (pair[0].timestamp(), pair[1].timestamp());
        if now >= start && now <= end {
            let span = (end - start).num_milliseconds();
            let fraction = if span == 0 {
                0.0
            } else {
                (now - start).num_milliseconds() as f64 / span as f64
            };
            return Some(index as f64 + fraction);
        }
    }

    // Single entry and now equals its timestamp.
    Some(0.0)
}

struct Wave {
    first: DateTime<Utc>,
    pixels_per_year: f64,
    amplitude: f64,
    center: f64,
}

impl Wave {
    fn new(first: DateTime<Utc>, frame: &Frame) -> Self {
        let amplitude = (frame.center - WAVE_SIDE_MARGIN).clamp(0.0, WAVE_MAX_AMPLITUDE);
        Self {
            first,
            pixels_per_year: BASE_PIXELS_PER_YEAR * frame.zoom,
            amplitude,
            center: frame.center,
        }
    }

    fn y_at(&self, t: DateTime<Utc>) -> f64 {
        TOP_PADDING + years_between(self.first, t) * self.pixels_per_year
    }

    fn x_at(&self, y: f64) -> f64 {
        self.center + self.amplitude * (TAU * (y - TOP_PADDING) / WAVE_WAVELENGTH).sin()
    }
}

fn wave(entries: &[TimelineEntry], frame: &Frame) -> TimelineLayout {
    let first = entries[0].timestamp();
    let last = entries[entries.len() - 1].timestamp();
    let curve = Wave::new(first, frame);

    let mut nodes = Vec::with_capacity(entries.len());
    let mut previous_y: Option<f64> = None;
    for (index, entry) in entries.iter().enumerate() {
        let y = curve.y_at(entry.timestamp());
        let mut x = curve.x_at(y);

        if let Some(prev) = previous_y {
            if y - prev < MIN_EVENT_GAP {
                x += if index % 2 == 0 { JITTER } else { -JITTER };
            }
        }
        previous_y = Some(y);

        nodes.push(LayoutNode {
            key: entry.key(),
            index,
            position: Point::new(x, y),
            side: frame.side_of(x),
        });
    }

    let last_y = curve.y_at(last);
    let path = wave_path(&curve, last_y);

    let now_marker = if frame.now < first || frame.now > last {
        None
    } else {
        let y = curve.y_at(frame.now);
        Some(Point::new(curve.x_at(y), y))
    };

    TimelineLayout {
        mode: LayoutMode::Wave,
        width: frame.width,
        height: last_y + BOTTOM_PADDING,
        nodes,
        path,
        now_marker,
    }
}

/// Sample the curve from the top to `last_y` in at most `MAX_PATH_SAMPLES` segments.
fn wave_path(curve: &Wave, last_y: f64) -> Vec<PathCommand> {
    let span = last_y - TOP_PADDING;
    let segments = if span.is_finite() && span > 0.0 {
        ((span / PATH_STEP).ceil() as usize).clamp(1, MAX_PATH_SAMPLES)
    } else {
        0
    };

    let mut path = Vec::with_capacity(segments + 1);
    path.push(PathCommand::MoveTo {
        to: Point::new(curve.x_at(TOP_PADDING), TOP_PADDING),
    });
    for i in 1..=segments {
        let y = if i == segments {
            last_y
        } else {
            TOP_PADDING + span * i as f64 / segments as f64
        };
        path.push(PathCommand::LineTo {
            to: Point::new(curve.x_at(y), y),
        });
    }

    path
}

fn start_of_year(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}

/// Fraction of its calendar year that has elapsed at `t`, in `[0, 1)`.
fn year_progress(t: DateTime<Utc>) -> f64 {
    let (Some(start), Some(end)) = (start_of_year(t.year()), start_of_year(t.year() + 1)) else {
        return 0.0;
    };
    let span = (end - start).num_milliseconds() as f64;
    (t - start).num_milliseconds() as f64 / span
}

struct Snake {
    first_year: i32,
    row_height: f64,
    left: f64,
    right: f64,
}

impl Snake {
    fn row_y(&self, row: usize) -> f64 {
        TOP_PADDING + row as f64 * self.row_height
    }

    fn position(&self, t: DateTime<Utc>) -> Point {
        let row = (t.year() - self.first_year).max(0) as usize;
        let progress = year_progress(t);
        let span = self.right - self.left;
        let x = if row % 2 == 0 {
            self.left + progress * span
        } else {
            self.right - progress * span
        };
        Point::new(x, self.row_y(row))
    }

    /// Start and end x of a row, in drawing order.
    fn row_ends(&self, row: usize) -> (f64, f64) {
        if row % 2 == 0 {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        }
    }
}

fn snake(entries: &[TimelineEntry], frame: &Frame) -> TimelineLayout {
    let first_year = entries[0].timestamp().year();
    let last_year = entries[entries.len() - 1].timestamp().year();
    let rows = (last_year - first_year + 1).max(1) as usize;

    let grid = Snake {
        first_year,
        row_height: SNAKE_ROW_HEIGHT * frame.zoom,
        left: SNAKE_MARGIN,
        right: frame.width - SNAKE_MARGIN,
    };

    let nodes = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let position = grid.position(entry.timestamp());
            LayoutNode {
                key: entry.key(),
                index,
                position,
                side: frame.side_of(position.x),
            }
        })
        .collect();

    let mut path = Vec::with_capacity(rows * 2 + 1);
    for row in 0..rows {
        let y = grid.row_y(row);
        let (start, end) = grid.row_ends(row);
        if row == 0 {
            path.push(PathCommand::MoveTo {
                to: Point::new(start, y),
            });
        }
        path.push(PathCommand::LineTo {
            to: Point::new(end, y),
        });

        if row + 1 < rows {
            let next_y = grid.row_y(row + 1);
            let bulge = if row % 2 == 0 {
                grid.row_height / 2.0
            } else {
                -grid.row_height / 2.0
            };
            path.push(PathCommand::CubicTo {
                c1: Point::new(end + bulge, y),
                c2: Point::new(end + bulge, next_y),
                to: Point::new(end, next_y),
            });
        }
    }

    let now_year = frame.now.year();
    let now_marker = if now_year < first_year || now_year > last_year {
        None
    } else {
        Some(grid.position(frame.now))
    };

    TimelineLayout {
        mode: LayoutMode::Snake,
        width: frame.width,
        height: grid.row_y(rows - 1) + BOTTOM_PADDING,
        nodes,
        path,
        now_marker,
    }
}
