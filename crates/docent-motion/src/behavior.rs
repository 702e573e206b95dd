//! Semantic motion behaviors built on [`ActionEngine::execute`].
//!
//! Each behavior blocks the calling thread for the full duration of its
//! constituent action(s), in sequence.

use docent_types::{ActionRequest, GoHomeOptions, MoveToOptions, RotateOptions};
use tracing::debug;

use crate::engine::{ActionEngine, MotionError};

impl ActionEngine {
    /// Return to the charging dock: one `GoHome` action with the fixed
    /// docking profile.
    pub fn go_home(&self) -> Result<(), MotionError> {
        debug!("returning to the charging dock");
        self.execute(&ActionRequest::GoHome(GoHomeOptions::default()))
    }

    /// Rotate in place to `angle` radians.
    pub fn rotate(&self, angle: f64) -> Result<(), MotionError> {
        debug!(angle, "rotating in place");
        self.execute(&ActionRequest::Rotate(RotateOptions { angle }))
    }

    /// Translate to `(x, y, z)`, then explicitly re-orient to `yaw`.
    ///
    /// Two actions, always: the move carries zeroed tolerance/retry/speed
    /// options, and the follow-up rotate is issued unconditionally. The
    /// robot's orientation is only guaranteed correct once the second
    /// action has ended.
    pub fn move_to(&self, x: f64, y: f64, z: f64, yaw: f64) -> Result<(), MotionError> {
        debug!(x, y, yaw, "moving to target");
        self.execute(&ActionRequest::MoveTo(MoveToOptions::toward(x, y, z, yaw)))?;
        self.rotate(yaw)
    }
}
