//! Reelsmith generation pipeline.
//!
//! Turns a natural-language request plus a catalog of available UI
//! components into a fully-timed, multi-track video composition:
//!
//! - Director: request + catalog -> VideoPlan
//! - Scene Planner: one outline -> one DetailedScene, all scenes concurrent
//! - Assembly: deterministic plan + scenes -> GeneratedComposition
//! - Refinement: AI critic scoring plus a bounded fix/rescore loop
//! - Orchestrator: sequences the above with best-version fallback
//!
//! The language model sits behind the [`generation::GenerationBackend`]
//! trait and is injected, never global.

pub mod assembly;
pub mod config;
pub mod director;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod logging;
pub mod orchestrator;
pub mod planner;
pub mod progress;
pub mod refinement;
pub mod timing;

pub use config::PipelineConfig;
pub use director::DirectorStage;
pub use error::{GenerationError, PipelineError, PipelineResult};
pub use gemini::GeminiBackend;
pub use generation::{GenerationBackend, GenerationClient, OutputContract};
pub use logging::RunLogger;
pub use orchestrator::Orchestrator;
pub use planner::ScenePlannerStage;
pub use progress::{ProgressCallback, ProgressReporter};
pub use refinement::RefinementStage;
