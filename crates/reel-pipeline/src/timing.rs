//! Timing and keyframe utilities.
//!
//! Pure functions, no I/O. Everything here is deterministic and covered by
//! unit tests; the stages call these instead of doing timing math inline.

use std::collections::BTreeMap;

use reel_models::{GeneratedTrack, Keyframe, RawKeyframe, TrackKind};

/// Minimum share of the total timeline a single scene may claim.
pub const MIN_SCENE_PERCENT: f64 = 5.0;

/// Maximum share of the total timeline a single scene may claim.
pub const MAX_SCENE_PERCENT: f64 = 50.0;

/// Keyframes whose maximum frame exceeds this are assumed to be authored on
/// the absolute timeline by mistake (~3 seconds at 30 fps).
pub const RELATIVE_FRAME_CEILING: u32 = 90;

/// Upper bound of the range misused keyframes are rescaled into.
pub const RESCALE_TARGET_MAX: u32 = 30;

/// Convert an AI-given percentage of the total timeline into frames.
///
/// The percentage is clamped to [5, 50] first so no single scene can claim
/// roughly none or roughly all of the timeline. A missing or non-finite
/// percentage falls back to an even split across the scene count. Either
/// way the result is floored at one frame: on tiny totals both the rounded
/// product and the integer split can reach zero, and a zero-length scene is
/// never valid.
pub fn percentage_to_frames(pct: Option<f64>, total_frames: u32, scene_count: usize) -> u32 {
    let frames = match pct {
        Some(p) if p.is_finite() => {
            let clamped = p.clamp(MIN_SCENE_PERCENT, MAX_SCENE_PERCENT);
            ((total_frames as f64) * clamped / 100.0).round() as u32
        }
        _ => total_frames / scene_count.max(1) as u32,
    };
    frames.max(1)
}

/// Repair keyframes authored with absolute-timeline frame values.
///
/// Keyframe frames must be relative to the owning element's start (frame 0
/// = appearance instant). When the maximum frame exceeds
/// [`RELATIVE_FRAME_CEILING`], the whole set is assumed to be absolute and
/// is linearly rescaled into 0..=[`RESCALE_TARGET_MAX`], preserving order
/// and mapping the minimum to 0.
///
/// This is a heuristic, not a proof: a legitimate relative entrance longer
/// than ~3 seconds is a known false positive and will be rescaled too.
/// Within the ceiling the function is the identity.
pub fn fix_relative_frame_misuse(keyframes: &[Keyframe]) -> Vec<Keyframe> {
    let frames: Vec<u32> = keyframes.iter().map(|k| k.frame).collect();
    let repaired = fix_relative_frame_values(&frames);
    keyframes
        .iter()
        .zip(repaired)
        .map(|(k, frame)| Keyframe {
            frame,
            values: k.values.clone(),
            easing: k.easing,
        })
        .collect()
}

/// The frame-only core of [`fix_relative_frame_misuse`], shared with the
/// cursor-specialized keyframes.
pub fn fix_relative_frame_values(frames: &[u32]) -> Vec<u32> {
    let Some(max) = frames.iter().copied().max() else {
        return Vec::new();
    };
    if max <= RELATIVE_FRAME_CEILING {
        return frames.to_vec();
    }

    let min = frames.iter().copied().min().unwrap_or(0);
    let span = max - min;

    frames
        .iter()
        .map(|f| {
            if span == 0 {
                0
            } else {
                ((f - min) as f64 * RESCALE_TARGET_MAX as f64 / span as f64).round() as u32
            }
        })
        .collect()
}

/// Merge a raw AI-authored keyframe into the canonical shape.
///
/// Flat animatable properties and the nested `values` map are merged into
/// one map, nested entries winning on collision. A keyframe with no
/// animatable value at all defaults to fully visible.
pub fn normalize_keyframe(raw: &RawKeyframe) -> Keyframe {
    let mut values: BTreeMap<String, f64> = raw.flat_values();
    if let Some(nested) = &raw.values {
        for (k, v) in nested {
            values.insert(k.clone(), *v);
        }
    }
    if values.is_empty() {
        values.insert("opacity".to_string(), 1.0);
    }
    Keyframe {
        frame: raw.frame,
        values,
        easing: raw.easing.unwrap_or_default(),
    }
}

/// Fixed z-layer priority of a track kind. Lower renders beneath higher.
///
/// Audio has no visual layer; it orders after all visual kinds so it sits
/// at the bottom of the editor's track list.
pub fn track_layer_priority(kind: TrackKind) -> u8 {
    match kind {
        TrackKind::Background => 0,
        TrackKind::Gradient => 1,
        TrackKind::Overlay => 2,
        TrackKind::Media => 3,
        TrackKind::Component => 4,
        TrackKind::Shape => 5,
        TrackKind::Text => 6,
        TrackKind::Particles => 7,
        TrackKind::Cursor => 8,
        TrackKind::Audio => 9,
    }
}

/// Insert a track into a list, keeping the list priority-sorted.
///
/// Equal-priority tracks keep insertion order (the new one goes last among
/// its peers), so repeated insertions always yield a priority-sorted list.
pub fn insert_by_priority(tracks: &mut Vec<GeneratedTrack>, track: GeneratedTrack) {
    let priority = track_layer_priority(track.kind);
    let position = tracks
        .iter()
        .position(|t| track_layer_priority(t.kind) > priority)
        .unwrap_or(tracks.len());
    tracks.insert(position, track);
}
