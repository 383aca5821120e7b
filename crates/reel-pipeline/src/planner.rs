//! Scene Planner stage: one SceneOutline -> one DetailedScene.
//!
//! Sibling scenes have no ordering dependency, only a dependency on the
//! plan, so the orchestrator plans them all concurrently. A scene whose
//! generation permanently fails degrades to a minimal deterministic
//! fallback instead of aborting the batch.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use reel_models::{
    ComponentBlock, ComponentCatalogEntry, CursorBlock, DetailedScene, Position, SceneOutline,
    ShapeElement, TextElement, TextRole, VideoPlan,
};

use crate::error::PipelineError;
use crate::generation::{GenerationClient, OutputContract};

const SYSTEM_PROMPT: &str = "You are a motion designer detailing one scene of a product \
video. You position elements on a normalized 0-1 canvas and animate them with keyframes.\n\
CRITICAL TIMING RULE: every keyframe's `frame` value is relative to the element it \
animates. Frame 0 is the instant that element appears on screen, NOT the start of the \
scene and NOT the start of the video. Entrance animations therefore start at frame 0 \
and typically finish by frame 15-30.";

/// The model's answer for one scene. Scene identity and absolute timing are
/// filled in afterwards; the model only authors content.
#[derive(Debug, Deserialize, JsonSchema)]
struct PlannedSceneResponse {
    #[serde(default)]
    texts: Vec<TextElement>,
    #[serde(default)]
    shapes: Vec<ShapeElement>,
    cursor: Option<CursorBlock>,
    component: Option<ComponentBlock>,
    narration: Option<String>,
}

/// The Scene Planner stage.
pub struct ScenePlannerStage {
    client: GenerationClient,
}

impl ScenePlannerStage {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Detail one scene. Infallible: a permanently failing generation call
    /// degrades to [`fallback_scene`].
    pub async fn plan_scene(
        &self,
        outline: &SceneOutline,
        plan: &VideoPlan,
        component: Option<&ComponentCatalogEntry>,
        start_frame: u32,
        include_voiceover: bool,
    ) -> DetailedScene {
        let contract = OutputContract::for_type::<PlannedSceneResponse>("DetailedScene");
        let prompt = build_prompt(outline, plan, component, include_voiceover);

        match self.client.generate(SYSTEM_PROMPT, &prompt, &contract).await {
            Ok(response) => {
                debug!(scene_id = %outline.id, "Scene planned");
                finalize_scene(response, outline, component, start_frame)
            }
            Err(e) => {
                let err: PipelineError = e.into();
                warn!(
                    scene_id = %outline.id,
                    error = %err,
                    "Scene generation failed; substituting fallback scene"
                );
                fallback_scene(outline, start_frame)
            }
        }
    }
}

fn build_prompt(
    outline: &SceneOutline,
    plan: &VideoPlan,
    component: Option<&ComponentCatalogEntry>,
    include_voiceover: bool,
) -> String {
    let mut prompt = format!(
        "Video: \"{}\" for {}. Core message: {}. Tone: {:?}, style: {:?}.\n\n\
         Scene to detail: {} ({}), {} frames long.\n\
         Purpose: {}\n",
        plan.title,
        plan.audience,
        plan.core_message,
        plan.tone,
        plan.style,
        outline.id,
        outline.scene_type,
        outline.duration_in_frames,
        outline.purpose,
    );

    if !outline.key_points.is_empty() {
        prompt.push_str(&format!("Key points: {}\n", outline.key_points.join("; ")));
    }
    if let Some(goals) = &outline.interaction_goals {
        if !goals.is_empty() {
            prompt.push_str(&format!("Interaction goals: {}\n", goals.join("; ")));
        }
    }
    prompt.push_str(&format!(
        "Animation intensity: {:?}\n",
        outline.animation_intensity
    ));

    if let Some(entry) = component {
        prompt.push_str(&format!(
            "\nFeatured component: {} (id {}, category {}).\n",
            entry.name, entry.id, entry.category
        ));
        if !entry.props.is_empty() {
            let props: Vec<String> = entry
                .props
                .iter()
                .map(|p| format!("{}: {}", p.name, p.prop_type))
                .collect();
            prompt.push_str(&format!("Props: {}\n", props.join(", ")));
        }
        if let Some(demo) = &entry.demo_props {
            prompt.push_str(&format!("Realistic demo props: {demo}\n"));
        }
        if let Some(interactive) = &entry.interactive_elements {
            let targets: Vec<String> = interactive
                .iter()
                .map(|el| format!("{} ({})", el.selector, el.action))
                .collect();
            prompt.push_str(&format!(
                "Interactive elements for cursor targeting: {}\n",
                targets.join("; ")
            ));
        }
        if let Some(related) = &entry.related_components {
            if !related.is_empty() {
                prompt.push_str(&format!("Often used with: {}\n", related.join(", ")));
            }
        }
        prompt.push_str(&format!(
            "Include a component block with component_id \"{}\".\n",
            entry.id
        ));
    } else {
        prompt.push_str("\nNo component for this scene; use texts and shapes only.\n");
    }

    if include_voiceover {
        prompt.push_str("Write a narration script for this scene in the `narration` field.\n");
    }

    prompt.push_str(
        "\nElement offsets (offset_frames) are frames from the scene start. An element \
         without duration_in_frames runs to the end of the scene. Remember the keyframe \
         rule: frame 0 means the instant the element appears.",
    );

    prompt
}

/// Attach identity, absolute timing and the resolved component id.
fn finalize_scene(
    response: PlannedSceneResponse,
    outline: &SceneOutline,
    component: Option<&ComponentCatalogEntry>,
    start_frame: u32,
) -> DetailedScene {
    let mut scene = DetailedScene {
        scene_id: outline.id.clone(),
        from: start_frame,
        duration_in_frames: outline.duration_in_frames,
        texts: response.texts,
        shapes: response.shapes,
        cursor: response.cursor,
        component: response.component,
        narration: response.narration,
    };

    match (&mut scene.component, component) {
        // The model sometimes echoes the component name instead of the id
        (Some(block), Some(entry)) => block.component_id = entry.id.clone(),
        // No resolved component for this scene: drop any invented block
        (block @ Some(_), None) => {
            warn!(scene_id = %outline.id, "Dropping component block for componentless scene");
            *block = None;
        }
        _ => {}
    }

    if scene.element_count() == 0 {
        warn!(scene_id = %outline.id, "Planned scene has no elements; using fallback");
        return fallback_scene(outline, start_frame);
    }

    scene
}

/// Minimal deterministic scene: a single centered title carrying the
/// outline's purpose.
fn fallback_scene(outline: &SceneOutline, start_frame: u32) -> DetailedScene {
    DetailedScene {
        scene_id: outline.id.clone(),
        from: start_frame,
        duration_in_frames: outline.duration_in_frames,
        texts: vec![TextElement {
            id: format!("{}-title", outline.id),
            content: outline.purpose.clone(),
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
    }
}
