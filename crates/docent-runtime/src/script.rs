//! [`TourScript`] – pre-authored narration, keyed by POI id.
//!
//! Narration is matched to a waypoint by the POI's stable id, never by its
//! position in the sorted list, so reordering or renaming waypoints on the
//! map cannot silently attach the wrong narration to a stop. A script that
//! does not cover every fetched POI is rejected before the robot moves.

use docent_types::{NarrationMessage, PointOfInterest};
use serde::{Deserialize, Serialize};

/// One scripted stop: which POI it belongs to and what to narrate there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub poi_id: String,
    pub message: NarrationMessage,
}

/// The pre-authored narration for a whole tour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourScript {
    entries: Vec<ScriptEntry>,
}

impl TourScript {
    pub fn new(entries: Vec<ScriptEntry>) -> Self {
        Self { entries }
    }

    /// The narration scripted for `poi_id`, if any.
    pub fn narration_for(&self, poi_id: &str) -> Option<&NarrationMessage> {
        self.entries
            .iter()
            .find(|entry| entry.poi_id == poi_id)
            .map(|entry| &entry.message)
    }

    /// Display names of the POIs in `pois` that have no scripted narration.
    /// Empty means the script covers the whole tour.
    pub fn missing_narrations(&self, pois: &[PointOfInterest]) -> Vec<String> {
        pois.iter()
            .filter(|poi| self.narration_for(&poi.id).is_none())
            .map(|poi| poi.metadata.display_name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_types::{PoiMetadata, Pose};

    fn poi(id: &str, name: &str) -> PointOfInterest {
        PointOfInterest {
            id: id.to_string(),
            metadata: PoiMetadata {
                display_name: name.to_string(),
            },
            pose: Pose {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                yaw: 0.0,
            },
        }
    }

    fn entry(poi_id: &str, intention: &str) -> ScriptEntry {
        ScriptEntry {
            poi_id: poi_id.to_string(),
            message: NarrationMessage::new("mainProcess", intention, "..."),
        }
    }

    #[test]
    fn narration_is_looked_up_by_poi_id() {
        let script = TourScript::new(vec![entry("p1", "Pos1"), entry("p2", "Pos2")]);
        assert_eq!(script.narration_for("p2").unwrap().intention, "Pos2");
        assert!(script.narration_for("p9").is_none());
    }

    #[test]
    fn uncovered_pois_are_reported_by_display_name() {
        let script = TourScript::new(vec![entry("p1", "Pos1")]);
        let pois = vec![poi("p1", "Entrance"), poi("p2", "Bronze Hall"), poi("p3", "Gift Shop")];
        assert_eq!(
            script.missing_narrations(&pois),
            vec!["Bronze Hall".to_string(), "Gift Shop".to_string()]
        );
    }

    #[test]
    fn full_coverage_reports_nothing_missing() {
        let script = TourScript::new(vec![entry("p1", "Pos1"), entry("p2", "Pos2")]);
        let pois = vec![poi("p1", "Entrance"), poi("p2", "Bronze Hall")];
        assert!(script.missing_narrations(&pois).is_empty());
    }
}
