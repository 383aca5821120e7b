//! Assembly stage: VideoPlan + DetailedScenes -> GeneratedComposition.
//!
//! Deterministic, no AI. Every element becomes its own track so the editor
//! can lock and reorder them independently; tracks are ordered by layer
//! priority. Output is structurally identical for identical input, modulo
//! freshly minted ids.

use tracing::warn;
use uuid::Uuid;

use reel_models::{
    ComponentCatalogEntry, CompositionSettings, CursorKeyframe, DetailedScene,
    GeneratedComposition, GeneratedTrack, ItemPayload, Keyframe, RawKeyframe, TrackItem,
    VideoPlan,
};

use crate::timing::{
    fix_relative_frame_misuse, fix_relative_frame_values, insert_by_priority, normalize_keyframe,
};

/// Longest text preview used as a track name.
const TEXT_NAME_PREVIEW_CHARS: usize = 24;

/// Assemble the composition from the plan and its detailed scenes.
pub fn assemble(
    plan: &VideoPlan,
    scenes: &[DetailedScene],
    settings: &CompositionSettings,
    catalog: &[ComponentCatalogEntry],
) -> GeneratedComposition {
    let mut tracks: Vec<GeneratedTrack> = Vec::new();

    for scene in scenes {
        for text in &scene.texts {
            let item = TrackItem {
                id: id_or_fresh(&text.id),
                name: text_preview(&text.content),
                from: scene.from.saturating_add(text.offset_frames),
                duration_in_frames: text
                    .duration_in_frames
                    .unwrap_or_else(|| scene.remaining_frames(text.offset_frames)),
                payload: ItemPayload::Text {
                    content: text.content.clone(),
                    role: text.role,
                    position: text.position,
                    font_size: text.font_size,
                    color: text.color.clone(),
                },
                keyframes: prepare_keyframes(&text.keyframes, settings.fps),
            };
            push_track(&mut tracks, item);
        }

        for shape in &scene.shapes {
            let item = TrackItem {
                id: id_or_fresh(&shape.id),
                name: format!("{:?}", shape.shape),
                from: scene.from.saturating_add(shape.offset_frames),
                duration_in_frames: shape
                    .duration_in_frames
                    .unwrap_or_else(|| scene.remaining_frames(shape.offset_frames)),
                payload: ItemPayload::Shape {
                    shape: shape.shape,
                    position: shape.position,
                    size: shape.size,
                    color: shape.color.clone(),
                },
                keyframes: prepare_keyframes(&shape.keyframes, settings.fps),
            };
            push_track(&mut tracks, item);
        }

        if let Some(component) = &scene.component {
            let name = ComponentCatalogEntry::find_by_id(catalog, &component.component_id)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| "Component".to_string());
            let item = TrackItem {
                id: id_or_fresh(""),
                name,
                from: scene.from.saturating_add(component.offset_frames),
                duration_in_frames: component
                    .duration_in_frames
                    .unwrap_or_else(|| scene.remaining_frames(component.offset_frames)),
                payload: ItemPayload::Component {
                    component_id: component.component_id.clone(),
                    props: component.props.clone(),
                    position: component.position,
                    scale: component.scale,
                },
                keyframes: prepare_keyframes(&component.keyframes, settings.fps),
            };
            push_track(&mut tracks, item);
        }

        if let Some(cursor) = &scene.cursor {
            let item = TrackItem {
                id: id_or_fresh(""),
                name: "Cursor".to_string(),
                from: scene.from.saturating_add(cursor.offset_frames),
                duration_in_frames: cursor
                    .duration_in_frames
                    .unwrap_or_else(|| scene.remaining_frames(cursor.offset_frames)),
                payload: ItemPayload::Cursor {
                    path: repair_cursor_path(&cursor.keyframes),
                },
                keyframes: Vec::new(),
            };
            push_track(&mut tracks, item);
        }
    }

    GeneratedComposition {
        id: Uuid::new_v4().to_string(),
        name: plan.title.clone(),
        width: settings.width,
        height: settings.height,
        fps: settings.fps,
        duration_in_frames: settings.duration_in_frames,
        tracks,
    }
}

/// Normalize and repair an element's keyframes; synthesize a default
/// entrance when there are none so nothing appears instantaneously.
fn prepare_keyframes(raw: &[RawKeyframe], fps: u32) -> Vec<Keyframe> {
    if raw.is_empty() {
        return default_entrance(fps);
    }
    let normalized: Vec<Keyframe> = raw.iter().map(normalize_keyframe).collect();
    fix_relative_frame_misuse(&normalized)
}

/// A short fade + scale-in over roughly half a second.
fn default_entrance(fps: u32) -> Vec<Keyframe> {
    let settle = (fps / 2).max(1);
    let mut start = Keyframe::single(0, "opacity", 0.0);
    start.values.insert("scale".to_string(), 0.9);
    let mut end = Keyframe::single(settle, "opacity", 1.0);
    end.values.insert("scale".to_string(), 1.0);
    vec![start, end]
}

/// Apply the relative-frame repair to a cursor path.
fn repair_cursor_path(path: &[CursorKeyframe]) -> Vec<CursorKeyframe> {
    let frames: Vec<u32> = path.iter().map(|k| k.frame).collect();
    path.iter()
        .zip(fix_relative_frame_values(&frames))
        .map(|(k, frame)| CursorKeyframe { frame, ..k.clone() })
        .collect()
}

/// Wrap an item in its own track and slot it in by layer priority.
fn push_track(tracks: &mut Vec<GeneratedTrack>, item: TrackItem) {
    let kind = item.payload.track_kind();
    let track = GeneratedTrack {
        id: Uuid::new_v4().to_string(),
        name: item.name.clone(),
        kind,
        locked: false,
        visible: true,
        items: vec![item],
    };
    insert_by_priority(tracks, track);
}

fn id_or_fresh(id: &str) -> String {
    if id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

fn text_preview(content: &str) -> String {
    if content.chars().count() <= TEXT_NAME_PREVIEW_CHARS {
        content.to_string()
    } else {
        let preview: String = content.chars().take(TEXT_NAME_PREVIEW_CHARS).collect();
        format!("{preview}…")
    }
}

/// Non-fatal post-build checks. Returned for logging and for the critic's
/// context; never fail the run.
pub fn validate_composition(composition: &GeneratedComposition) -> Vec<String> {
    let mut warnings = Vec::new();

    if composition.item_count() == 0 {
        warnings.push("composition has no items".to_string());
    }

    for track in &composition.tracks {
        for item in &track.items {
            if item.end_frame() > composition.duration_in_frames {
                warnings.push(format!(
                    "item {} ends at frame {} past the composition end {}",
                    item.name,
                    item.end_frame(),
                    composition.duration_in_frames
                ));
            }
            if let ItemPayload::Component { component_id, .. } = &item.payload {
                if component_id.is_empty() {
                    warnings.push(format!("component item {} has no component reference", item.name));
                }
            }
        }
    }

    for warning in &warnings {
        warn!(warning = %warning, "Composition advisory");
    }
    warnings
}
