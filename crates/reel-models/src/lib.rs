//! Shared data models for the Reelsmith generation core.
//!
//! This crate provides Serde-serializable types for:
//! - Component catalog entries and interactive element inventories
//! - Video plans and scene outlines (Director output)
//! - Detailed scenes and their elements (Scene Planner output)
//! - Generated compositions, tracks and items (Assembly output)
//! - Refinement scores, issues and mechanical fixes
//! - Generation requests and the result envelope

pub mod catalog;
pub mod composition;
pub mod export;
pub mod keyframe;
pub mod plan;
pub mod refinement;
pub mod request;
pub mod scene;

// Re-export common types
pub use catalog::{ComponentCatalogEntry, ComponentProp, InteractiveElement};
pub use composition::{GeneratedComposition, GeneratedTrack, ItemPayload, TrackItem, TrackKind};
pub use export::{to_editor_tracks, EditorItem, EditorTrack};
pub use keyframe::{CursorKeyframe, Easing, Keyframe, RawKeyframe};
pub use plan::{AnimationIntensity, SceneOutline, SceneType, VideoPlan, VideoStyle, VideoTone};
pub use refinement::{IssueCategory, RefinementIssue, RefinementResult, Severity, SuggestedFix};
pub use request::{
    CompositionSettings, GenerationOutcome, GenerationRequest, RunMetadata, StageTimings,
};
pub use scene::{
    ComponentBlock, CursorBlock, DetailedScene, Position, ShapeElement, ShapeKind, Size,
    TextElement, TextRole,
};
