//! [`ActionEngine`] – submit, poll, block.
//!
//! One action is in flight per call, never more: `execute` submits, then
//! spin-polls the status endpoint until the remote reports the terminal
//! code. The calling thread is consumed for the whole duration; there is
//! no queue and no parallelism anywhere in this layer.

use std::time::{Duration, Instant};

use docent_client::{ApiError, RobotApi};
use docent_types::{ActionHandle, ActionRequest, PollPolicy};
use thiserror::Error;
use tracing::{debug, trace};

/// Fixed pacing of the action status poll.
pub const ACTION_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors raised while driving an action to completion.
#[derive(Error, Debug)]
pub enum MotionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The configured `max_wait` elapsed without a terminal status.
    #[error("action {action_id} still pending after {waited:?}")]
    DeadlineExceeded {
        action_id: String,
        waited: Duration,
    },
    /// The cancellation flag tripped while waiting.
    #[error("wait for action {action_id} cancelled")]
    Cancelled { action_id: String },
}

/// Blocking driver for the remote action engine.
///
/// The state machine per action is `Submitted → Polling → Terminal`. A
/// remote-reported failure status is not distinguished from "still
/// running": only the terminal code ends the wait, so an unbounded policy
/// on a broken action blocks until the operator intervenes.
pub struct ActionEngine {
    api: RobotApi,
    poll: PollPolicy,
}

impl ActionEngine {
    /// Engine with the default 100 ms unbounded poll.
    pub fn new(api: RobotApi) -> Self {
        Self::with_policy(api, PollPolicy::new(ACTION_POLL_INTERVAL))
    }

    pub fn with_policy(api: RobotApi, poll: PollPolicy) -> Self {
        Self { api, poll }
    }

    /// The underlying typed API, for pose and POI queries.
    pub fn api(&self) -> &RobotApi {
        &self.api
    }

    /// Submit `request` and return the handle the remote issued.
    ///
    /// No retry: a transport failure or a malformed response propagates.
    pub fn submit(&self, request: &ActionRequest) -> Result<ActionHandle, MotionError> {
        debug!(action = request.name(), "submitting action");
        Ok(self.api.create_action(request)?)
    }

    /// Block until the action behind `handle` reaches the terminal status.
    ///
    /// Polls at the configured interval, forever by default. Returns
    /// [`MotionError::DeadlineExceeded`] once `max_wait` elapses and
    /// [`MotionError::Cancelled`] when the cancel flag trips; with the
    /// default policy neither can happen.
    pub fn await_completion(&self, handle: &ActionHandle) -> Result<(), MotionError> {
        let started = Instant::now();
        loop {
            if self.poll.cancelled() {
                return Err(MotionError::Cancelled {
                    action_id: handle.action_id.clone(),
                });
            }
            self.poll.pause();
            let status = self.api.action_status(handle)?;
            if status.is_ended() {
                debug!(action_id = %handle.action_id, "action ended");
                return Ok(());
            }
            trace!(action_id = %handle.action_id, status = status.status, "action still running");
            if self.poll.deadline_passed(started) {
                return Err(MotionError::DeadlineExceeded {
                    action_id: handle.action_id.clone(),
                    waited: started.elapsed(),
                });
            }
        }
    }

    /// Submit `request` and block until it ends: the unit of work every
    /// behavior is built from.
    pub fn execute(&self, request: &ActionRequest) -> Result<(), MotionError> {
        let handle = self.submit(request)?;
        self.await_completion(&handle)
    }
}
