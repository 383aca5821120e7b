//! Video plan models (Director stage output).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall tone of the video narration and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoTone {
    #[default]
    Professional,
    Friendly,
    Energetic,
    Minimal,
    Playful,
    #[serde(other)]
    Other,
}

/// Visual style of the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStyle {
    #[default]
    Modern,
    Classic,
    Bold,
    Subtle,
    #[serde(other)]
    Other,
}

/// Narrative role of a scene within the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    Intro,
    Feature,
    Transition,
    Tutorial,
    Outro,
}

impl SceneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneType::Intro => "intro",
            SceneType::Feature => "feature",
            SceneType::Transition => "transition",
            SceneType::Tutorial => "tutorial",
            SceneType::Outro => "outro",
        }
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much animation a scene should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationIntensity {
    Low,
    #[default]
    Medium,
    High,
}

/// One scene in the video plan.
///
/// Created by the Director with a frame duration already resolved from the
/// AI-given percentage. Immutable downstream.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneOutline {
    /// Run-scoped opaque id
    pub id: String,

    /// Narrative role
    pub scene_type: SceneType,

    /// What this scene is meant to accomplish
    pub purpose: String,

    /// Duration in frames, derived from a clamped percentage of the total
    pub duration_in_frames: u32,

    /// Catalog id of the featured component, when the Director's component
    /// name resolved against the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,

    /// Key points the scene should communicate
    #[serde(default)]
    pub key_points: Vec<String>,

    /// Interaction goals for tutorial scenes (cursor demonstrations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_goals: Option<Vec<String>>,

    /// Animation intensity
    #[serde(default)]
    pub animation_intensity: AnimationIntensity,
}

/// The global video plan produced by the Director.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoPlan {
    /// Video title
    pub title: String,

    /// Intended audience
    pub audience: String,

    /// The single message the video should leave behind
    pub core_message: String,

    /// Narration/pacing tone
    pub tone: VideoTone,

    /// Visual style
    pub style: VideoStyle,

    /// Declared total duration in frames
    pub duration_in_frames: u32,

    /// Ordered scene outlines
    pub scenes: Vec<SceneOutline>,
}

impl VideoPlan {
    /// Absolute difference between the sum of scene durations and the
    /// declared total.
    ///
    /// The sum is expected to approximate the total; drift is logged by the
    /// Director, never fatal.
    pub fn duration_drift(&self) -> u32 {
        let sum: u32 = self.scenes.iter().map(|s| s.duration_in_frames).sum();
        sum.abs_diff(self.duration_in_frames)
    }

    /// Whether the plan contains a scene of the given type.
    pub fn has_scene_type(&self, scene_type: SceneType) -> bool {
        self.scenes.iter().any(|s| s.scene_type == scene_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(id: &str, scene_type: SceneType, duration: u32) -> SceneOutline {
        SceneOutline {
            id: id.to_string(),
            scene_type,
            purpose: "test".to_string(),
            duration_in_frames: duration,
            component_id: None,
            key_points: vec![],
            interaction_goals: None,
            animation_intensity: AnimationIntensity::Medium,
        }
    }

    fn plan(total: u32, scenes: Vec<SceneOutline>) -> VideoPlan {
        VideoPlan {
            title: "Demo".to_string(),
            audience: "Developers".to_string(),
            core_message: "It works".to_string(),
            tone: VideoTone::Professional,
            style: VideoStyle::Modern,
            duration_in_frames: total,
            scenes,
        }
    }

    #[test]
    fn test_duration_drift_exact() {
        let p = plan(
            300,
            vec![
                outline("s1", SceneType::Intro, 180),
                outline("s2", SceneType::Outro, 120),
            ],
        );
        assert_eq!(p.duration_drift(), 0);
    }

    #[test]
    fn test_duration_drift_over_and_under() {
        let over = plan(300, vec![outline("s1", SceneType::Intro, 330)]);
        assert_eq!(over.duration_drift(), 30);

        let under = plan(300, vec![outline("s1", SceneType::Intro, 270)]);
        assert_eq!(under.duration_drift(), 30);
    }

    #[test]
    fn test_has_scene_type() {
        let p = plan(
            300,
            vec![
                outline("s1", SceneType::Intro, 150),
                outline("s2", SceneType::Feature, 150),
            ],
        );
        assert!(p.has_scene_type(SceneType::Intro));
        assert!(p.has_scene_type(SceneType::Feature));
        assert!(!p.has_scene_type(SceneType::Outro));
    }

    #[test]
    fn test_tone_unknown_value_deserializes_to_other() {
        let tone: VideoTone = serde_json::from_str("\"cinematic\"").unwrap();
        assert_eq!(tone, VideoTone::Other);
    }
}
