//! Generated composition models (Assembly stage output).
//!
//! A composition holds one track per element so each can be independently
//! locked or reordered by the editor. Track order encodes z-order: earlier
//! tracks render beneath later ones.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::keyframe::{CursorKeyframe, Keyframe};
use crate::scene::{Position, ShapeKind, Size, TextRole};

/// Closed set of track types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Background,
    Gradient,
    Overlay,
    Media,
    Component,
    Shape,
    Text,
    Particles,
    Cursor,
    Audio,
}

impl TrackKind {
    /// All track kinds, in layer-priority order.
    pub const ALL: &'static [TrackKind] = &[
        TrackKind::Background,
        TrackKind::Gradient,
        TrackKind::Overlay,
        TrackKind::Media,
        TrackKind::Component,
        TrackKind::Shape,
        TrackKind::Text,
        TrackKind::Particles,
        TrackKind::Cursor,
        TrackKind::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Background => "background",
            TrackKind::Gradient => "gradient",
            TrackKind::Overlay => "overlay",
            TrackKind::Media => "media",
            TrackKind::Component => "component",
            TrackKind::Shape => "shape",
            TrackKind::Text => "text",
            TrackKind::Particles => "particles",
            TrackKind::Cursor => "cursor",
            TrackKind::Audio => "audio",
        }
    }

    /// Whether items of this kind render pixels (audio does not).
    pub fn is_visual(&self) -> bool {
        !matches!(self, TrackKind::Audio)
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a track kind from a string.
#[derive(Debug, Error)]
#[error("unknown track kind: {0}")]
pub struct TrackKindParseError(String);

impl FromStr for TrackKind {
    type Err = TrackKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.to_lowercase())
            .ok_or_else(|| TrackKindParseError(s.to_string()))
    }
}

/// Kind-specific payload of a track item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemPayload {
    Text {
        content: String,
        role: TextRole,
        position: Position,
        #[serde(skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Shape {
        shape: ShapeKind,
        position: Position,
        size: Size,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Component {
        component_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        props: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scale: Option<f64>,
    },
    Cursor {
        /// Cursor path; frames relative to the item's own start
        path: Vec<CursorKeyframe>,
    },
}

impl ItemPayload {
    /// The track kind this payload belongs on.
    pub fn track_kind(&self) -> TrackKind {
        match self {
            ItemPayload::Text { .. } => TrackKind::Text,
            ItemPayload::Shape { .. } => TrackKind::Shape,
            ItemPayload::Component { .. } => TrackKind::Component,
            ItemPayload::Cursor { .. } => TrackKind::Cursor,
        }
    }
}

/// A single timed item on a track.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrackItem {
    /// Run-scoped id
    pub id: String,

    /// Display name
    pub name: String,

    /// Absolute start frame on the composition timeline
    pub from: u32,

    /// Duration in frames
    pub duration_in_frames: u32,

    pub payload: ItemPayload,

    /// Element-relative animation keyframes (repaired and normalized)
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl TrackItem {
    /// Absolute end frame (exclusive). Saturates at `u32::MAX`; offsets in
    /// AI-authored input can be arbitrarily large.
    pub fn end_frame(&self) -> u32 {
        self.from.saturating_add(self.duration_in_frames)
    }
}

/// An ordered, z-layered container of one element.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedTrack {
    pub id: String,
    pub name: String,
    pub kind: TrackKind,
    #[serde(default)]
    pub locked: bool,
    pub visible: bool,
    pub items: Vec<TrackItem>,
}

/// A fully-timed multi-track composition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedComposition {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_in_frames: u32,
    /// Track order encodes z-order: earlier renders beneath later
    pub tracks: Vec<GeneratedTrack>,
}

impl GeneratedComposition {
    /// Total item count across all tracks.
    pub fn item_count(&self) -> usize {
        self.tracks.iter().map(|t| t.items.len()).sum()
    }

    /// Find an item by id across all tracks.
    ///
    /// Linear scan; compositions hold tens of items at observed scale.
    pub fn find_item(&self, item_id: &str) -> Option<&TrackItem> {
        self.tracks
            .iter()
            .flat_map(|t| t.items.iter())
            .find(|i| i.id == item_id)
    }

    /// Find an item mutably by id across all tracks.
    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut TrackItem> {
        self.tracks
            .iter_mut()
            .flat_map(|t| t.items.iter_mut())
            .find(|i| i.id == item_id)
    }
}
