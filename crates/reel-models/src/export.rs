//! Conversion to the editor's persisted track representation.
//!
//! The editor stores tracks in its own shape. The conversion is pure and
//! total: any track or item arriving without an id gets a fresh one minted,
//! and there is no failure path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::composition::{GeneratedComposition, ItemPayload, TrackKind};
use crate::keyframe::Keyframe;

/// A timed item as the editor persists it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditorItem {
    pub id: String,
    pub name: String,
    pub from: u32,
    pub duration_in_frames: u32,
    pub payload: ItemPayload,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

/// A track as the editor persists it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditorTrack {
    pub id: String,
    pub name: String,
    pub kind: TrackKind,
    pub locked: bool,
    pub visible: bool,
    pub items: Vec<EditorItem>,
}

/// Convert a generated composition into editor tracks.
///
/// Track order (and therefore z-order) is preserved as-is.
pub fn to_editor_tracks(composition: &GeneratedComposition) -> Vec<EditorTrack> {
    composition
        .tracks
        .iter()
        .map(|track| EditorTrack {
            id: fresh_id_if_empty(&track.id),
            name: track.name.clone(),
            kind: track.kind,
            locked: track.locked,
            visible: track.visible,
            items: track
                .items
                .iter()
                .map(|item| EditorItem {
                    id: fresh_id_if_empty(&item.id),
                    name: item.name.clone(),
                    from: item.from,
                    duration_in_frames: item.duration_in_frames,
                    payload: item.payload.clone(),
                    keyframes: item.keyframes.clone(),
                })
                .collect(),
        })
        .collect()
}

fn fresh_id_if_empty(id: &str) -> String {
    if id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{GeneratedTrack, TrackItem};

    fn composition_with_ids(track_id: &str, item_id: &str) -> GeneratedComposition {
        GeneratedComposition {
            id: "c1".to_string(),
            name: "Demo".to_string(),
            width: 1920,
            height: 1080,
            fps: 30,
            duration_in_frames: 300,
            tracks: vec![GeneratedTrack {
                id: track_id.to_string(),
                name: "Cursor".to_string(),
                kind: TrackKind::Cursor,
                locked: false,
                visible: true,
                items: vec![TrackItem {
                    id: item_id.to_string(),
                    name: "Pointer".to_string(),
                    from: 0,
                    duration_in_frames: 60,
                    payload: ItemPayload::Cursor { path: vec![] },
                    keyframes: vec![],
                }],
            }],
        }
    }

    #[test]
    fn test_existing_ids_are_preserved() {
        let tracks = to_editor_tracks(&composition_with_ids("t1", "i1"));
        assert_eq!(tracks[0].id, "t1");
        assert_eq!(tracks[0].items[0].id, "i1");
    }

    #[test]
    fn test_missing_ids_get_fresh_uuids() {
        let tracks = to_editor_tracks(&composition_with_ids("", ""));
        assert!(!tracks[0].id.is_empty());
        assert!(!tracks[0].items[0].id.is_empty());
        assert_ne!(tracks[0].id, tracks[0].items[0].id);
    }

    #[test]
    fn test_track_order_preserved() {
        let mut comp = composition_with_ids("t1", "i1");
        let mut second = comp.tracks[0].clone();
        second.id = "t2".to_string();
        second.kind = TrackKind::Text;
        comp.tracks.push(second);

        let tracks = to_editor_tracks(&comp);
        assert_eq!(tracks[0].id, "t1");
        assert_eq!(tracks[1].id, "t2");
    }
}
