//! Director stage: request + catalog -> VideoPlan.
//!
//! The Director plans the narrative: global metadata plus an ordered scene
//! list. Scene durations come back as percentages of the total so the model
//! reasons about narrative weight, not frame math; the conversion to frames
//! happens here via the timing utilities.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use reel_models::{
    AnimationIntensity, ComponentCatalogEntry, CompositionSettings, GenerationRequest,
    SceneOutline, SceneType, VideoPlan, VideoStyle, VideoTone,
};

use crate::error::{PipelineError, PipelineResult};
use crate::generation::{GenerationClient, OutputContract};
use crate::timing::percentage_to_frames;

const SYSTEM_PROMPT: &str = "You are a video director planning a short product video \
built from a catalog of real UI components. You decide the narrative arc, the scenes, \
and which catalog component each scene features. You never invent components that are \
not in the catalog.";

/// Scene outline as the model authors it: percentage duration, component by
/// name.
#[derive(Debug, Deserialize, JsonSchema)]
struct RawSceneOutline {
    scene_type: SceneType,
    purpose: String,
    /// Share of the total video, in percent
    duration_percent: Option<f64>,
    /// Catalog component name; resolved case-insensitively
    component_name: Option<String>,
    #[serde(default)]
    key_points: Vec<String>,
    interaction_goals: Option<Vec<String>>,
    #[serde(default)]
    animation_intensity: AnimationIntensity,
}

/// The model's full answer to the planning prompt.
#[derive(Debug, Deserialize, JsonSchema)]
struct DirectorResponse {
    title: String,
    audience: String,
    core_message: String,
    tone: VideoTone,
    style: VideoStyle,
    scenes: Vec<RawSceneOutline>,
}

/// The Director stage.
pub struct DirectorStage {
    client: GenerationClient,
}

impl DirectorStage {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Produce a video plan for the request.
    ///
    /// Terminal failure only when the generation client never returns a
    /// structured plan; there is no meaningful fallback plan.
    pub async fn plan(
        &self,
        request: &GenerationRequest,
        settings: &CompositionSettings,
        catalog: &[ComponentCatalogEntry],
    ) -> PipelineResult<VideoPlan> {
        let contract = OutputContract::for_type::<DirectorResponse>("VideoPlan");
        let prompt = build_prompt(request, settings, catalog);

        let response: DirectorResponse = self
            .client
            .generate(SYSTEM_PROMPT, &prompt, &contract)
            .await
            .map_err(|e| PipelineError::stage_failed("director", e.to_string()))?;

        let plan = resolve_plan(response, settings, catalog);
        for warning in advisory_warnings(&plan, settings) {
            warn!(warning = %warning, "Plan advisory");
        }

        info!(
            title = %plan.title,
            scenes = plan.scenes.len(),
            duration_in_frames = plan.duration_in_frames,
            "Director produced plan"
        );
        Ok(plan)
    }
}

fn build_prompt(
    request: &GenerationRequest,
    settings: &CompositionSettings,
    catalog: &[ComponentCatalogEntry],
) -> String {
    let mut catalog_lines = String::new();
    for entry in catalog {
        let props: Vec<&str> = entry.props.iter().map(|p| p.name.as_str()).collect();
        catalog_lines.push_str(&format!(
            "- {} ({}): {}{}\n",
            entry.name,
            entry.category,
            entry.description.as_deref().unwrap_or("no description"),
            if props.is_empty() {
                String::new()
            } else {
                format!("; props: {}", props.join(", "))
            }
        ));
    }
    if catalog_lines.is_empty() {
        catalog_lines.push_str("(the catalog is empty; plan text-and-shape scenes only)\n");
    }

    format!(
        "Plan a video for this request:\n{}\n\n\
         Target length: {} seconds ({} frames at {} fps).\n\
         Canvas: {}x{}.\n\n\
         Available components:\n{}\n\
         Rules:\n\
         - Give each scene a duration as a percentage of the whole video (duration_percent).\n\
         - Percentages should sum to roughly 100.\n\
         - Open with an intro scene and close with an outro scene.\n\
         - Use between 2 and 15 scenes.\n\
         - Reference components by their exact catalog name in component_name, or omit it.\n\
         - Tutorial scenes should list interaction_goals describing what the cursor demonstrates.",
        request.user_request,
        request.target_duration_seconds,
        settings.duration_in_frames,
        settings.fps,
        settings.width,
        settings.height,
        catalog_lines,
    )
}

/// Turn the raw response into a resolved plan: frames instead of
/// percentages, catalog ids instead of names.
fn resolve_plan(
    response: DirectorResponse,
    settings: &CompositionSettings,
    catalog: &[ComponentCatalogEntry],
) -> VideoPlan {
    let scene_count = response.scenes.len();
    let scenes = response
        .scenes
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let component_id = raw.component_name.as_deref().and_then(|name| {
                let found = ComponentCatalogEntry::find_by_name(catalog, name);
                if found.is_none() {
                    warn!(
                        component_name = %name,
                        scene_index = index,
                        "Planned component not in catalog; scene left component-less"
                    );
                }
                found.map(|c| c.id.clone())
            });

            SceneOutline {
                id: format!("scene-{}", index + 1),
                scene_type: raw.scene_type,
                purpose: raw.purpose,
                duration_in_frames: percentage_to_frames(
                    raw.duration_percent,
                    settings.duration_in_frames,
                    scene_count,
                ),
                component_id,
                key_points: raw.key_points,
                interaction_goals: raw.interaction_goals,
                animation_intensity: raw.animation_intensity,
            }
        })
        .collect();

    VideoPlan {
        title: response.title,
        audience: response.audience,
        core_message: response.core_message,
        tone: response.tone,
        style: response.style,
        duration_in_frames: settings.duration_in_frames,
        scenes,
    }
}

/// Non-fatal plan checks. Returned for logging; never fail the run.
fn advisory_warnings(plan: &VideoPlan, settings: &CompositionSettings) -> Vec<String> {
    let mut warnings = Vec::new();
    let fps = settings.fps.max(1);

    let drift = plan.duration_drift();
    // Tolerate rounding drift of up to half a second
    if drift > fps / 2 {
        warnings.push(format!(
            "scene durations drift {drift} frames from the declared total of {}",
            plan.duration_in_frames
        ));
    }

    if !plan.has_scene_type(SceneType::Intro) {
        warnings.push("plan has no intro scene".to_string());
    }
    if !plan.has_scene_type(SceneType::Outro) {
        warnings.push("plan has no outro scene".to_string());
    }

    let count = plan.scenes.len();
    if !(2..=15).contains(&count) {
        warnings.push(format!("scene count {count} outside the expected 2-15 range"));
    }

    for scene in &plan.scenes {
        if scene.duration_in_frames < fps {
            warnings.push(format!(
                "scene {} is shorter than one second ({} frames)",
                scene.id, scene.duration_in_frames
            ));
        }
        let has_goals = scene
            .interaction_goals
            .as_ref()
            .is_some_and(|g| !g.is_empty());
        if scene.scene_type == SceneType::Tutorial && has_goals && scene.duration_in_frames < 3 * fps
        {
            warnings.push(format!(
                "tutorial scene {} is too short for its interactions ({} frames)",
                scene.id, scene.duration_in_frames
            ));
        }
    }

    warnings
}
