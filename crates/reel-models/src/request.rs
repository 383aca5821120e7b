//! Generation request and result envelope models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::composition::GeneratedComposition;
use crate::export::EditorTrack;
use crate::plan::VideoPlan;
use crate::refinement::RefinementResult;
use crate::scene::DetailedScene;

/// Canvas and timing settings for a composition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct CompositionSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_in_frames: u32,
}

impl CompositionSettings {
    /// 1080p at 30 fps with the given target length in seconds.
    pub fn from_target_seconds(seconds: u32) -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            duration_in_frames: seconds * 30,
        }
    }
}

impl Default for CompositionSettings {
    fn default() -> Self {
        Self::from_target_seconds(30)
    }
}

/// A request to generate a composition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationRequest {
    /// Natural-language description of the desired video
    pub user_request: String,

    /// Whether to generate narration scripts for voiceover
    #[serde(default)]
    pub include_voiceover: bool,

    /// Voice to use when voiceover is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,

    /// Target video length in seconds
    #[serde(default = "default_target_seconds")]
    pub target_duration_seconds: u32,

    /// Minimum refinement score to accept without iterating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quality_score: Option<u8>,

    /// Maximum refinement fix-and-rescore iterations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_refinement_iterations: Option<u32>,
}

fn default_target_seconds() -> u32 {
    30
}

impl GenerationRequest {
    /// Create a request with defaults for everything but the prompt.
    pub fn new(user_request: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            include_voiceover: false,
            voice_name: None,
            target_duration_seconds: default_target_seconds(),
            min_quality_score: None,
            max_refinement_iterations: None,
        }
    }

}

/// Wall-clock millis spent in each stage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct StageTimings {
    pub director_ms: u64,
    pub planner_ms: u64,
    pub assembly_ms: u64,
    pub refinement_ms: u64,
}

/// Run-level metadata attached to every outcome, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunMetadata {
    pub total_duration_ms: u64,
    pub stage_timings: StageTimings,
    pub refinement_iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u8>,
    /// When the run finished
    pub generated_at: DateTime<Utc>,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            total_duration_ms: 0,
            stage_timings: StageTimings::default(),
            refinement_iterations: 0,
            final_score: None,
            generated_at: Utc::now(),
        }
    }
}

/// The result envelope returned by the orchestrator.
///
/// Unrecoverable stage failures surface as `success == false` with a
/// human-readable error; no error type crosses this boundary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationOutcome {
    pub success: bool,

    /// Editor-ready track representation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<EditorTrack>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_plan: Option<VideoPlan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<DetailedScene>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<GeneratedComposition>,

    /// Final refinement verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<RefinementResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub metadata: RunMetadata,
}

impl GenerationOutcome {
    /// A failed outcome with a human-readable error.
    pub fn failed(error: impl Into<String>, metadata: RunMetadata) -> Self {
        Self {
            success: false,
            tracks: None,
            video_plan: None,
            scenes: None,
            composition: None,
            quality: None,
            error: Some(error.into()),
            metadata,
        }
    }
}
