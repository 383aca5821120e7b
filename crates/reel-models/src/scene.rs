//! Detailed scene models (Scene Planner stage output).
//!
//! Element offsets are frames from the scene start; an element without an
//! explicit duration runs to the end of its scene.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::keyframe::{CursorKeyframe, RawKeyframe};

/// Normalized position on the canvas (0-1 in both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const CENTER: Position = Position { x: 0.5, y: 0.5 };
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Normalized size on the canvas (0-1 in both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Narrative role of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Title,
    Subtitle,
    #[default]
    Body,
    Caption,
}

/// Shape primitives available to the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Line,
    Arrow,
}

/// A text element within a scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextElement {
    /// Run-scoped id; may be empty in AI output, Assembly mints one
    #[serde(default)]
    pub id: String,

    /// Text content
    pub content: String,

    #[serde(default)]
    pub role: TextRole,

    /// Frames from scene start
    #[serde(default)]
    pub offset_frames: u32,

    /// Explicit duration; None runs to scene end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_frames: Option<u32>,

    #[serde(default)]
    pub position: Position,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// CSS color string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub keyframes: Vec<RawKeyframe>,
}

/// A shape element within a scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShapeElement {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub shape: ShapeKind,

    #[serde(default)]
    pub offset_frames: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_frames: Option<u32>,

    #[serde(default)]
    pub position: Position,

    pub size: Size,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub keyframes: Vec<RawKeyframe>,
}

/// A cursor demonstration block within a scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CursorBlock {
    #[serde(default)]
    pub offset_frames: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_frames: Option<u32>,

    /// Cursor path; frames are relative to the block's own start
    pub keyframes: Vec<CursorKeyframe>,
}

/// An embedded catalog component within a scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComponentBlock {
    /// Catalog id of the component
    pub component_id: String,

    #[serde(default)]
    pub offset_frames: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_frames: Option<u32>,

    /// Props to render the component with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    #[serde(default)]
    pub keyframes: Vec<RawKeyframe>,
}

/// A fully-detailed scene produced by the Scene Planner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetailedScene {
    /// Back-reference to the outline this scene details
    pub scene_id: String,

    /// Absolute start frame on the composition timeline
    pub from: u32,

    /// Scene duration in frames
    pub duration_in_frames: u32,

    #[serde(default)]
    pub texts: Vec<TextElement>,

    #[serde(default)]
    pub shapes: Vec<ShapeElement>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorBlock>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentBlock>,

    /// Narration script for voiceover, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

impl DetailedScene {
    /// Total number of elements across all kinds.
    pub fn element_count(&self) -> usize {
        self.texts.len()
            + self.shapes.len()
            + usize::from(self.cursor.is_some())
            + usize::from(self.component.is_some())
    }

    /// Duration remaining for an element starting at the given offset.
    pub fn remaining_frames(&self, offset_frames: u32) -> u32 {
        self.duration_in_frames.saturating_sub(offset_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_frames() {
        let scene = DetailedScene {
            scene_id: "s1".to_string(),
            from: 0,
            duration_in_frames: 120,
            texts: vec![],
            shapes: vec![],
            cursor: None,
            component: None,
            narration: None,
        };
        assert_eq!(scene.remaining_frames(0), 120);
        assert_eq!(scene.remaining_frames(30), 90);
        // Offsets past the scene end clamp to zero
        assert_eq!(scene.remaining_frames(150), 0);
    }

    #[test]
    fn test_element_count() {
        let mut scene = DetailedScene {
            scene_id: "s1".to_string(),
            from: 0,
            duration_in_frames: 120,
            texts: vec![TextElement {
                id: "t1".to_string(),
                content: "Hello".to_string(),
                role: TextRole::Title,
                offset_frames: 0,
                duration_in_frames: None,
                position: Position::CENTER,
                font_size: None,
                color: None,
                keyframes: vec![],
            }],
            shapes: vec![],
            cursor: None,
            component: None,
            narration: None,
        };
        assert_eq!(scene.element_count(), 1);

        scene.cursor = Some(CursorBlock {
            offset_frames: 0,
            duration_in_frames: None,
            keyframes: vec![],
        });
        assert_eq!(scene.element_count(), 2);
    }

    #[test]
    fn test_text_element_tolerates_sparse_ai_output() {
        // Only content provided; everything else defaults
        let text: TextElement = serde_json::from_str(r#"{"content": "Welcome"}"#).unwrap();
        assert_eq!(text.content, "Welcome");
        assert_eq!(text.offset_frames, 0);
        assert_eq!(text.position, Position::CENTER);
        assert!(text.keyframes.is_empty());
    }
}
