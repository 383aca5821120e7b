//! Refinement stage: AI critic plus mechanical fix application.
//!
//! The critic never sees the full composition; it gets a compact structural
//! summary so the prompt stays bounded regardless of composition size. Fix
//! application is deterministic and limited to the machine-actionable fix
//! kinds; everything else the critic dislikes stays visible in the score.

use tracing::{debug, info, warn};

use reel_models::{
    DetailedScene, GeneratedComposition, ItemPayload, Position, RefinementIssue, RefinementResult,
    SuggestedFix, VideoPlan,
};

use crate::error::{PipelineError, PipelineResult};
use crate::generation::{GenerationClient, OutputContract};

const SYSTEM_PROMPT: &str = "You are a motion-design reviewer scoring a generated video \
composition against its plan. Score 0-100. Report concrete issues with severity \
critical, warning or suggestion. When an issue has a purely mechanical remedy (timing, \
position, or keyframe replacement on one element), attach a fix with the element id; \
otherwise leave the fix out.";

/// How many raw items the critic sees verbatim.
const ITEM_SAMPLE_LIMIT: usize = 5;

/// The Refinement stage.
pub struct RefinementStage {
    client: GenerationClient,
}

impl RefinementStage {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Score a composition against its plan.
    pub async fn score(
        &self,
        composition: &GeneratedComposition,
        plan: &VideoPlan,
        scenes: &[DetailedScene],
    ) -> PipelineResult<RefinementResult> {
        let contract = OutputContract::for_type::<RefinementResult>("RefinementResult");
        let summary = build_summary(composition, plan, scenes);

        let result: RefinementResult = self
            .client
            .generate(SYSTEM_PROMPT, &summary, &contract)
            .await
            .map_err(PipelineError::from)?;
        let result = result.with_clamped_score();

        info!(
            score = result.score,
            issues = result.issues.len(),
            "Composition scored"
        );
        Ok(result)
    }
}

/// Compact structural digest of the composition for the critic prompt.
fn build_summary(
    composition: &GeneratedComposition,
    plan: &VideoPlan,
    scenes: &[DetailedScene],
) -> String {
    let mut summary = format!(
        "Plan: \"{}\" for {}. Core message: {}. Declared total: {} frames.\n\n\
         Composition: {}x{} at {} fps, {} frames, {} tracks, {} items.\n\nTracks:\n",
        plan.title,
        plan.audience,
        plan.core_message,
        plan.duration_in_frames,
        composition.width,
        composition.height,
        composition.fps,
        composition.duration_in_frames,
        composition.tracks.len(),
        composition.item_count(),
    );

    for track in &composition.tracks {
        summary.push_str(&format!(
            "- {} \"{}\": {} item(s)\n",
            track.kind,
            track.name,
            track.items.len()
        ));
    }

    summary.push_str("\nScene timeline:\n");
    for scene in scenes {
        summary.push_str(&format!(
            "- {} frames {}-{}: {} element(s)\n",
            scene.scene_id,
            scene.from,
            scene.from + scene.duration_in_frames,
            scene.element_count(),
        ));
    }

    summary.push_str("\nSampled items:\n");
    let sampled = composition
        .tracks
        .iter()
        .flat_map(|t| t.items.iter())
        .take(ITEM_SAMPLE_LIMIT);
    for item in sampled {
        match serde_json::to_string(item) {
            Ok(json) => summary.push_str(&format!("{json}\n")),
            Err(e) => warn!(item = %item.id, error = %e, "Could not render item sample"),
        }
    }

    summary
}

/// Apply every machine-actionable fix to a clone of the composition.
///
/// Fixes are matched to items by element id with a linear scan over all
/// tracks; fine at the tens-of-items scale this pipeline produces. Returns
/// the fixed clone and how many fixes landed.
pub fn apply_fixes(
    composition: &GeneratedComposition,
    issues: &[RefinementIssue],
) -> (GeneratedComposition, usize) {
    let mut fixed = composition.clone();
    let mut applied = 0usize;

    for issue in issues {
        let (Some(fix), Some(element_id)) = (&issue.fix, &issue.element_id) else {
            continue;
        };
        let Some(item) = fixed.find_item_mut(element_id) else {
            debug!(element_id = %element_id, "Fix targets unknown element; skipping");
            continue;
        };

        match fix {
            SuggestedFix::AdjustTiming {
                from,
                duration_in_frames,
            } => {
                if let Some(from) = from {
                    item.from = *from;
                }
                if let Some(duration) = duration_in_frames {
                    item.duration_in_frames = *duration;
                }
            }
            SuggestedFix::AdjustPosition { x, y } => {
                let target = Position { x: *x, y: *y };
                match &mut item.payload {
                    ItemPayload::Text { position, .. } | ItemPayload::Shape { position, .. } => {
                        *position = target;
                    }
                    ItemPayload::Component { position, .. } => *position = Some(target),
                    ItemPayload::Cursor { .. } => {
                        debug!(element_id = %element_id, "Position fix on cursor item ignored");
                        continue;
                    }
                }
            }
            SuggestedFix::ReplaceKeyframes { keyframes } => {
                item.keyframes = keyframes.clone();
            }
        }
        applied += 1;
    }

    (fixed, applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{
        GeneratedTrack, IssueCategory, Keyframe, Severity, TextRole, TrackItem, TrackKind,
        VideoStyle, VideoTone,
    };

    fn item(id: &str) -> TrackItem {
        TrackItem {
            id: id.to_string(),
            name: "Title".to_string(),
            from: 0,
            duration_in_frames: 60,
            payload: ItemPayload::Text {
                content: "Welcome".to_string(),
                role: TextRole::Title,
                position: Position::CENTER,
                font_size: None,
                color: None,
            },
            keyframes: vec![],
        }
    }

    fn composition(items: Vec<TrackItem>) -> GeneratedComposition {
        GeneratedComposition {
            id: "c1".to_string(),
            name: "Demo".to_string(),
            width: 1920,
            height: 1080,
            fps: 30,
            duration_in_frames: 300,
            tracks: items
                .into_iter()
                .map(|i| GeneratedTrack {
                    id: format!("track-{}", i.id),
                    name: i.name.clone(),
                    kind: TrackKind::Text,
                    locked: false,
                    visible: true,
                    items: vec![i],
                })
                .collect(),
        }
    }

    fn issue(element_id: Option<&str>, fix: Option<SuggestedFix>) -> RefinementIssue {
        RefinementIssue {
            severity: Severity::Warning,
            category: IssueCategory::Timing,
            description: "test".to_string(),
            element_id: element_id.map(|s| s.to_string()),
            scene_id: None,
            fix,
        }
    }

    fn plan() -> VideoPlan {
        VideoPlan {
            title: "Demo".to_string(),
            audience: "Developers".to_string(),
            core_message: "It works".to_string(),
            tone: VideoTone::Professional,
            style: VideoStyle::Modern,
            duration_in_frames: 300,
            scenes: vec![],
        }
    }

    #[test]
    fn test_apply_timing_fix() {
        let comp = composition(vec![item("i1")]);
        let issues = vec![issue(
            Some("i1"),
            Some(SuggestedFix::AdjustTiming {
                from: Some(30),
                duration_in_frames: Some(90),
            }),
        )];
        let (fixed, applied) = apply_fixes(&comp, &issues);
        assert_eq!(applied, 1);
        let fixed_item = fixed.find_item("i1").unwrap();
        assert_eq!(fixed_item.from, 30);
        assert_eq!(fixed_item.duration_in_frames, 90);
        // Original untouched
        assert_eq!(comp.find_item("i1").unwrap().from, 0);
    }

    #[test]
    fn test_apply_position_fix() {
        let comp = composition(vec![item("i1")]);
        let issues = vec![issue(
            Some("i1"),
            Some(SuggestedFix::AdjustPosition { x: 0.2, y: 0.8 }),
        )];
        let (fixed, applied) = apply_fixes(&comp, &issues);
        assert_eq!(applied, 1);
        match &fixed.find_item("i1").unwrap().payload {
            ItemPayload::Text { position, .. } => {
                assert_eq!(position.x, 0.2);
                assert_eq!(position.y, 0.8);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_apply_keyframe_replacement() {
        let comp = composition(vec![item("i1")]);
        let replacement = vec![Keyframe::single(0, "opacity", 1.0)];
        let issues = vec![issue(
            Some("i1"),
            Some(SuggestedFix::ReplaceKeyframes {
                keyframes: replacement.clone(),
            }),
        )];
        let (fixed, applied) = apply_fixes(&comp, &issues);
        assert_eq!(applied, 1);
        assert_eq!(fixed.find_item("i1").unwrap().keyframes, replacement);
    }

    #[test]
    fn test_fixless_and_unmatched_issues_are_skipped() {
        let comp = composition(vec![item("i1")]);
        let issues = vec![
            issue(Some("i1"), None),
            issue(None, Some(SuggestedFix::AdjustPosition { x: 0.1, y: 0.1 })),
            issue(
                Some("ghost"),
                Some(SuggestedFix::AdjustTiming {
                    from: Some(5),
                    duration_in_frames: None,
                }),
            ),
        ];
        let (fixed, applied) = apply_fixes(&comp, &issues);
        assert_eq!(applied, 0);
        assert_eq!(fixed.find_item("i1").unwrap().from, 0);
    }

    #[test]
    fn test_summary_is_compact_and_structural() {
        let items: Vec<TrackItem> = (0..12).map(|i| item(&format!("i{i}"))).collect();
        let comp = composition(items);
        let scenes = vec![DetailedScene {
            scene_id: "scene-1".to_string(),
            from: 0,
            duration_in_frames: 300,
            texts: vec![],
            shapes: vec![],
            cursor: None,
            component: None,
            narration: None,
        }];
        let summary = build_summary(&comp, &plan(), &scenes);

        assert!(summary.contains("12 tracks, 12 items"));
        assert!(summary.contains("scene-1 frames 0-300"));
        // Only the sample limit of raw items is embedded
        let raw_items = summary.matches("\"duration_in_frames\"").count();
        assert!(raw_items <= ITEM_SAMPLE_LIMIT);
    }
}
