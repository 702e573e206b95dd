//! [`TourRunner`] – the dock → move → speak → dock sequence.

use docent_client::{ApiError, PoseReport};
use docent_motion::{ActionEngine, MotionError};
use docent_speech::{NarrationError, Narrator};
use docent_types::{NarrationMessage, PointOfInterest};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::script::TourScript;

/// Errors that abort a tour run.
#[derive(Error, Debug)]
pub enum TourError {
    #[error(transparent)]
    Motion(#[from] MotionError),
    #[error(transparent)]
    Narration(#[from] NarrationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The script does not cover every POI on the map; the named waypoints
    /// have no narration. Raised before any waypoint motion.
    #[error("no narration scripted for: {0:?}")]
    MissingNarration(Vec<String>),
}

/// Sort `pois` into traversal order: ascending display name, id as the
/// tie-break so the order is identical for any input permutation.
pub fn sort_waypoints(pois: &mut [PointOfInterest]) {
    pois.sort_by(|a, b| {
        a.metadata
            .display_name
            .cmp(&b.metadata.display_name)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Drives one complete tour, blocking for its entire duration.
pub struct TourRunner {
    engine: ActionEngine,
    narrator: Narrator,
    script: TourScript,
}

impl TourRunner {
    pub fn new(engine: ActionEngine, narrator: Narrator, script: TourScript) -> Self {
        Self {
            engine,
            narrator,
            script,
        }
    }

    /// Fetch the map's POIs and sort them into traversal order.
    pub fn waypoints(&self) -> Result<Vec<PointOfInterest>, TourError> {
        let mut pois = self.engine.api().pois()?;
        sort_waypoints(&mut pois);
        Ok(pois)
    }

    /// The narration scripted for `poi_id`, if any.
    pub fn narration_for(&self, poi_id: &str) -> Option<&NarrationMessage> {
        self.script.narration_for(poi_id)
    }

    /// Run the whole tour: dock, visit every waypoint in order narrating at
    /// each, dock again. Blocks until the robot is back on the charger.
    pub fn run(&self) -> Result<(), TourError> {
        self.log_pose("tour start");

        info!("returning to the dock before the tour");
        self.engine.go_home()?;

        let waypoints = self.waypoints()?;
        info!(count = waypoints.len(), "waypoints fetched and sorted");

        let missing = self.script.missing_narrations(&waypoints);
        if !missing.is_empty() {
            return Err(TourError::MissingNarration(missing));
        }

        for poi in &waypoints {
            info!(
                waypoint = %poi.metadata.display_name,
                x = poi.pose.x,
                y = poi.pose.y,
                "moving to waypoint"
            );
            self.engine
                .move_to(poi.pose.x, poi.pose.y, poi.pose.z, poi.pose.yaw)?;

            let narration = self
                .script
                .narration_for(&poi.id)
                .ok_or_else(|| TourError::MissingNarration(vec![poi.metadata.display_name.clone()]))?;
            self.narrator.speak(narration)?;

            self.log_pose(&poi.metadata.display_name);
        }

        info!("tour complete, returning to the dock");
        self.engine.go_home()?;
        Ok(())
    }

    /// Diagnostic pose snapshot; the unlocalized fallback is tolerated.
    fn log_pose(&self, context: &str) {
        match self.engine.api().pose() {
            Ok(PoseReport::Localized(pose)) => {
                debug!(context, x = pose.x, y = pose.y, yaw = pose.yaw, "current pose");
            }
            Ok(PoseReport::Unlocalized(pois)) => {
                warn!(context, pois = pois.len(), "robot not localized, pose unavailable");
            }
            Err(e) => warn!(context, error = %e, "pose query failed"),
        }
    }
}
