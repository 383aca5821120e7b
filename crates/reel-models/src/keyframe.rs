//! Keyframe models.
//!
//! A keyframe's `frame` is ALWAYS relative to its owning element's own
//! start: frame 0 is the instant the element appears, independent of where
//! the element sits on the scene or composition timeline. AI-authored
//! content routinely violates this by supplying absolute-timeline values;
//! the repair heuristic lives in `reel-pipeline::timing`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interpolation easing between keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
    Spring,
    #[serde(other)]
    Other,
}

/// A canonical keyframe: element-relative frame, property values, easing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Keyframe {
    /// Frames since the owning element appeared (0 = appearance instant)
    pub frame: u32,

    /// Property name to value
    pub values: BTreeMap<String, f64>,

    /// Easing into the next keyframe
    #[serde(default)]
    pub easing: Easing,
}

impl Keyframe {
    /// Create a keyframe with a single property value.
    pub fn single(frame: u32, prop: &str, value: f64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(prop.to_string(), value);
        Self {
            frame,
            values,
            easing: Easing::default(),
        }
    }
}

/// A keyframe as authored by the AI, before normalization.
///
/// AI output uses two shapes interchangeably: animatable numeric properties
/// flat at the top level, or gathered under a nested `values` map. Both are
/// accepted; `reel-pipeline::timing::normalize_keyframe` merges them into a
/// canonical [`Keyframe`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawKeyframe {
    /// Frames since the owning element appeared
    #[serde(default)]
    pub frame: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,

    /// Nested values map (alternate AI output shape)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, f64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
}

impl RawKeyframe {
    /// Collect the flat animatable properties that were actually present.
    pub fn flat_values(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        let props = [
            ("opacity", self.opacity),
            ("scale", self.scale),
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("blur", self.blur),
        ];
        for (name, value) in props {
            if let Some(v) = value {
                out.insert(name.to_string(), v);
            }
        }
        out
    }
}

/// A cursor keyframe: normalized position plus an optional click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CursorKeyframe {
    /// Frames since the cursor element appeared
    pub frame: u32,

    /// Horizontal position, normalized 0-1 across the canvas
    pub x: f64,

    /// Vertical position, normalized 0-1 across the canvas
    pub y: f64,

    /// Whether a click fires at this keyframe
    #[serde(default)]
    pub click: bool,

    #[serde(default)]
    pub easing: Easing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_keyframe_flat_values() {
        let raw = RawKeyframe {
            frame: 10,
            opacity: Some(0.5),
            scale: Some(1.2),
            ..Default::default()
        };
        let values = raw.flat_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("opacity"), Some(&0.5));
        assert_eq!(values.get("scale"), Some(&1.2));
    }

    #[test]
    fn test_raw_keyframe_deserializes_flat_shape() {
        let raw: RawKeyframe =
            serde_json::from_str(r#"{"frame": 15, "opacity": 0.8, "x": 0.3}"#).unwrap();
        assert_eq!(raw.frame, 15);
        assert_eq!(raw.opacity, Some(0.8));
        assert!(raw.values.is_none());
    }

    #[test]
    fn test_raw_keyframe_deserializes_nested_shape() {
        let raw: RawKeyframe =
            serde_json::from_str(r#"{"frame": 0, "values": {"opacity": 1.0}}"#).unwrap();
        assert_eq!(raw.frame, 0);
        let values = raw.values.unwrap();
        assert_eq!(values.get("opacity"), Some(&1.0));
    }

    #[test]
    fn test_raw_keyframe_missing_frame_defaults_to_zero() {
        let raw: RawKeyframe = serde_json::from_str(r#"{"opacity": 1.0}"#).unwrap();
        assert_eq!(raw.frame, 0);
    }

    #[test]
    fn test_easing_unknown_value_deserializes_to_other() {
        let easing: Easing = serde_json::from_str("\"bounce\"").unwrap();
        assert_eq!(easing, Easing::Other);
    }

    #[test]
    fn test_keyframe_single() {
        let kf = Keyframe::single(0, "opacity", 0.0);
        assert_eq!(kf.frame, 0);
        assert_eq!(kf.values.get("opacity"), Some(&0.0));
    }
}
