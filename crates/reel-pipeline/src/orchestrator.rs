//! Orchestrator: sequences the stages and owns the refinement loop.
//!
//! Director -> concurrent Scene Planner fan-out -> Assembly -> bounded
//! refine/fix/rescore loop. Every scored version is retained; if the
//! quality threshold is never met within the iteration budget, the
//! highest-scoring version is returned rather than a failure, so the run
//! always terminates with a usable, quality-disclosed result.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use reel_models::{
    to_editor_tracks, ComponentCatalogEntry, CompositionSettings, DetailedScene,
    GeneratedComposition, GenerationOutcome, GenerationRequest, RefinementResult, RunMetadata,
    StageTimings, VideoPlan,
};

use crate::assembly::{assemble, validate_composition};
use crate::config::PipelineConfig;
use crate::director::DirectorStage;
use crate::generation::{GenerationBackend, GenerationClient};
use crate::logging::RunLogger;
use crate::planner::ScenePlannerStage;
use crate::progress::ProgressReporter;
use crate::refinement::{apply_fixes, RefinementStage};

/// The generation pipeline orchestrator.
///
/// One logical workflow per call; no state is shared across concurrent
/// runs. The backend is injected so tests run against scripted fakes.
pub struct Orchestrator {
    director: DirectorStage,
    planner: ScenePlannerStage,
    refinement: RefinementStage,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: PipelineConfig) -> Self {
        let client = GenerationClient::new(backend, &config);
        Self {
            director: DirectorStage::new(client.clone()),
            planner: ScenePlannerStage::new(client.clone()),
            refinement: RefinementStage::new(client),
            config,
        }
    }

    /// Run the whole pipeline for one request.
    ///
    /// Never panics and never returns an error type: unrecoverable stage
    /// failures come back as a failed [`GenerationOutcome`] with a
    /// human-readable message.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        settings: &CompositionSettings,
        catalog: &[ComponentCatalogEntry],
        progress: &ProgressReporter,
    ) -> GenerationOutcome {
        let run_started = Instant::now();
        let logger = RunLogger::new(Uuid::new_v4().to_string());
        let mut timings = StageTimings::default();

        // Director
        logger.stage_start("director");
        progress.report("Planning video...");
        let stage_started = Instant::now();
        let plan = match self.director.plan(request, settings, catalog).await {
            Ok(plan) => plan,
            Err(e) => {
                logger.failed("director", &e.to_string());
                timings.director_ms = stage_started.elapsed().as_millis() as u64;
                return GenerationOutcome::failed(
                    e.to_string(),
                    metadata(run_started, timings, 0, None),
                );
            }
        };
        timings.director_ms = stage_started.elapsed().as_millis() as u64;
        logger.stage_done("director", timings.director_ms);

        // Scene Planner fan-out
        logger.stage_start("planner");
        progress.report(&format!("Detailing {} scenes...", plan.scenes.len()));
        let stage_started = Instant::now();
        let scenes = self.plan_scenes(&plan, catalog, request.include_voiceover).await;
        timings.planner_ms = stage_started.elapsed().as_millis() as u64;
        logger.stage_done("planner", timings.planner_ms);

        // Assembly
        logger.stage_start("assembly");
        progress.report("Assembling composition...");
        let stage_started = Instant::now();
        let composition = assemble(&plan, &scenes, settings, catalog);
        let advisories = validate_composition(&composition);
        if !advisories.is_empty() {
            logger.degraded("assembly", &advisories.join("; "));
        }
        timings.assembly_ms = stage_started.elapsed().as_millis() as u64;
        logger.stage_done("assembly", timings.assembly_ms);

        // Refinement loop
        logger.stage_start("refinement");
        progress.report("Reviewing quality...");
        let stage_started = Instant::now();
        let threshold = request
            .min_quality_score
            .unwrap_or(self.config.default_min_score);
        let max_iterations = request
            .max_refinement_iterations
            .unwrap_or(self.config.default_max_refinement_iterations);
        let (best, iterations) = self
            .refine(composition, &plan, &scenes, threshold, max_iterations, progress, &logger)
            .await;
        timings.refinement_ms = stage_started.elapsed().as_millis() as u64;
        logger.stage_done("refinement", timings.refinement_ms);

        let (composition, quality) = best;
        let final_score = quality.as_ref().map(|q| q.score);
        progress.report("Done");
        info!(
            run_id = %logger.run_id(),
            score = ?final_score,
            iterations,
            "Generation run complete"
        );

        GenerationOutcome {
            success: true,
            tracks: Some(to_editor_tracks(&composition)),
            video_plan: Some(plan),
            scenes: Some(scenes),
            composition: Some(composition),
            quality,
            error: None,
            metadata: metadata(run_started, timings, iterations, final_score),
        }
    }

    /// Plan all scenes concurrently.
    ///
    /// Absolute start frames are a running offset over the ordered outline
    /// list. A single scene's failure degrades only that scene (the
    /// planner substitutes a fallback), never the batch.
    async fn plan_scenes(
        &self,
        plan: &VideoPlan,
        catalog: &[ComponentCatalogEntry],
        include_voiceover: bool,
    ) -> Vec<DetailedScene> {
        let mut start_frame = 0u32;
        let futures: Vec<_> = plan
            .scenes
            .iter()
            .map(|outline| {
                let component = outline
                    .component_id
                    .as_deref()
                    .and_then(|id| ComponentCatalogEntry::find_by_id(catalog, id));
                let future = self.planner.plan_scene(
                    outline,
                    plan,
                    component,
                    start_frame,
                    include_voiceover,
                );
                start_frame += outline.duration_in_frames;
                future
            })
            .collect();

        join_all(futures).await
    }

    /// The bounded refine -> fix -> rescore loop.
    ///
    /// Issues at most `max_iterations + 1` scoring calls. Returns the
    /// highest-scoring (composition, quality) pair observed plus the number
    /// of fix iterations performed. A scoring failure is absorbed: the run
    /// proceeds with the best version seen so far (or the unscored
    /// assembly).
    async fn refine(
        &self,
        composition: GeneratedComposition,
        plan: &VideoPlan,
        scenes: &[DetailedScene],
        threshold: u8,
        max_iterations: u32,
        progress: &ProgressReporter,
        logger: &RunLogger,
    ) -> ((GeneratedComposition, Option<RefinementResult>), u32) {
        let mut versions: Vec<(GeneratedComposition, RefinementResult)> = Vec::new();

        match self.refinement.score(&composition, plan, scenes).await {
            Ok(result) => versions.push((composition.clone(), result)),
            Err(e) => {
                logger.degraded("refinement", &format!("initial scoring failed: {e}"));
                return ((composition, None), 0);
            }
        }

        let mut iterations = 0u32;
        while iterations < max_iterations {
            let Some((current, last)) = versions.last() else {
                break;
            };
            if last.meets_threshold(threshold) {
                break;
            }

            let (fixed, applied) = apply_fixes(current, &last.issues);
            if applied == 0 {
                info!("No machine-actionable fixes remain; keeping best version");
                break;
            }
            iterations += 1;
            progress.report(&format!(
                "Applying {applied} fixes (iteration {iterations})..."
            ));

            match self.refinement.score(&fixed, plan, scenes).await {
                Ok(result) => versions.push((fixed, result)),
                Err(e) => {
                    logger.degraded("refinement", &format!("rescoring failed: {e}"));
                    break;
                }
            }
        }

        // Highest score wins; ties go to the latest version
        let best = versions
            .into_iter()
            .enumerate()
            .max_by_key(|(index, (_, result))| (result.score, *index));
        match best {
            Some((_, (best_composition, result))) => {
                if !result.meets_threshold(threshold) {
                    warn!(
                        score = result.score,
                        threshold, "Quality threshold not met; returning best version"
                    );
                }
                ((best_composition, Some(result)), iterations)
            }
            None => ((composition, None), iterations),
        }
    }
}

fn metadata(
    run_started: Instant,
    stage_timings: StageTimings,
    refinement_iterations: u32,
    final_score: Option<u8>,
) -> RunMetadata {
    RunMetadata {
        total_duration_ms: run_started.elapsed().as_millis() as u64,
        stage_timings,
        refinement_iterations,
        final_score,
        generated_at: Utc::now(),
    }
}
