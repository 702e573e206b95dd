use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Robot identity a controller session is bound to.
///
/// The action service authenticates with an `Authorization: Robot <name>`
/// header derived from `name`; the header never changes for the lifetime of
/// the session. Robot names must not contain spaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotIdentity {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl RobotIdentity {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }

    /// Base URL of the action service, e.g. `http://192.168.11.1:1448`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Value of the `Authorization` header bound to this identity.
    pub fn authorization(&self) -> String {
        format!("Robot {}", self.name)
    }
}

/// Position and orientation snapshot, re-fetched on demand.
///
/// POI poses on the wire omit `z`; it defaults to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub yaw: f64,
}

/// Map metadata attached to a point of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiMetadata {
    pub display_name: String,
}

/// A named, positioned tour waypoint enumerated from the robot's map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub metadata: PoiMetadata,
    pub pose: Pose,
}

/// One narration unit: the scene/intention pair selects the pre-authored
/// context on the speech service, `content` is the prompt played for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationMessage {
    pub scene: String,
    pub intention: String,
    pub content: String,
}

impl NarrationMessage {
    pub fn new(
        scene: impl Into<String>,
        intention: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            scene: scene.into(),
            intention: intention.into(),
            content: content.into(),
        }
    }
}

/// Target coordinate of a move action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Inner `move_options` payload of a move action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelOptions {
    pub mode: i32,
    pub flags: Vec<String>,
    pub yaw: f64,
    pub acceptable_precision: f64,
    pub fail_retry_count: u32,
    pub speed_ratio: f64,
}

/// Options payload of a `MoveTo` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToOptions {
    pub target: MoveTarget,
    pub move_options: TravelOptions,
}

impl MoveToOptions {
    /// Move to `(x, y, z)` carrying `yaw` in the options, with tolerance,
    /// retry count, and speed ratio all zeroed. Orientation is only
    /// guaranteed after the follow-up rotate action, not by the move itself.
    pub fn toward(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            target: MoveTarget { x, y, z },
            move_options: TravelOptions {
                mode: 0,
                flags: Vec::new(),
                yaw,
                acceptable_precision: 0.0,
                fail_retry_count: 0,
                speed_ratio: 0.0,
            },
        }
    }
}

/// Motion mode selector nested inside docking options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveMode {
    pub mode: i32,
}

/// Inner `gohome_options` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockingOptions {
    pub flags: String,
    pub back_to_landing: bool,
    pub charging_retry_count: u32,
    pub move_options: DriveMode,
}

/// Options payload of a `GoHome` action.
///
/// The default is the fixed docking profile: dock flag, return to the
/// landing point, one charging retry, motion mode 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoHomeOptions {
    pub gohome_options: DockingOptions,
}

impl Default for GoHomeOptions {
    fn default() -> Self {
        Self {
            gohome_options: DockingOptions {
                flags: "dock".to_string(),
                back_to_landing: true,
                charging_retry_count: 1,
                move_options: DriveMode { mode: 0 },
            },
        }
    }
}

/// Options payload of a `Rotate` action. `angle` is radians, in-place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateOptions {
    pub angle: f64,
}

/// A motion action to submit to the remote action engine, one variant per
/// registered action kind. Serializes to the exact creation-endpoint body:
/// `{"action_name": "<registry id>", "options": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_name", content = "options")]
pub enum ActionRequest {
    #[serde(rename = "slamtec.agent.actions.MoveToAction")]
    MoveTo(MoveToOptions),
    #[serde(rename = "slamtec.agent.actions.GoHomeAction")]
    GoHome(GoHomeOptions),
    #[serde(rename = "slamtec.agent.actions.RotateToAction")]
    Rotate(RotateOptions),
}

impl ActionRequest {
    /// The remote registry identifier this request submits under.
    pub fn name(&self) -> &'static str {
        match self {
            ActionRequest::MoveTo(_) => "slamtec.agent.actions.MoveToAction",
            ActionRequest::GoHome(_) => "slamtec.agent.actions.GoHomeAction",
            ActionRequest::Rotate(_) => "slamtec.agent.actions.RotateToAction",
        }
    }
}

/// Correlation key issued by the remote engine on submission. Held for the
/// duration of one blocking call and discarded once a terminal status is
/// observed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionHandle {
    pub action_id: String,
}

/// Status code reported for an in-flight action, nested at `state.status`
/// in the poll response. Code 4 is the only terminal value; every other
/// value means "still running".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ActionStatus {
    pub status: i64,
}

impl ActionStatus {
    /// The sole terminal ("ended") status code.
    pub const ENDED: i64 = 4;

    pub fn is_ended(&self) -> bool {
        self.status == Self::ENDED
    }
}

/// Pacing of a blocking poll loop.
///
/// `max_wait` and `cancel` both default to off, in which case the loop
/// blocks until the remote reports the expected code, however long that
/// takes. Operators supervising a session can bound the wait or wire the
/// cancel flag to a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Sleep between consecutive polls.
    pub interval: Duration,
    /// Upper bound on the total wait, measured from the start of the loop.
    pub max_wait: Option<Duration>,
    /// Shared flag checked on every iteration; tripping it aborts the wait.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl PollPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_wait: None,
            cancel: None,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// True once the cancel flag has been tripped.
    pub fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// True once `max_wait` has elapsed since `started`.
    pub fn deadline_passed(&self, started: Instant) -> bool {
        self.max_wait.is_some_and(|max| started.elapsed() >= max)
    }

    /// Block the calling thread for one poll interval.
    pub fn pause(&self) {
        std::thread::sleep(self.interval);
    }
}
