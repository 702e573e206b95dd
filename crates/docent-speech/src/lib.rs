//! `docent-speech` – Narration handshake
//!
//! Talks to the speech service, which is a different server from the action
//! engine and has its own completion protocol. [`Narrator::speak`] runs a
//! two-phase handshake:
//!
//! 1. **push-until-accepted** – POST the narration record to `/api/setData`
//!    every 500 ms until the reply's `code` equals the string `"1"`.
//! 2. **poll-until-idle** – GET `/api/getStatus` every 500 ms until `code`
//!    equals `"0"`, i.e. playback has finished.
//!
//! Both phases are unbounded by default. A disabled narrator (no speech
//! service configured for this robot) is a no-op that still emits the two
//! diagnostic log lines, so callers must not infer from `speak` returning
//! that narration actually played.

use std::time::{Duration, Instant};

use docent_client::{Transport, TransportError};
use docent_types::{NarrationMessage, PollPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

const SET_DATA_PATH: &str = "/api/setData";
const GET_STATUS_PATH: &str = "/api/getStatus";

/// Reply code meaning the service accepted the pushed record.
const CODE_ACCEPTED: &str = "1";
/// Reply code meaning playback has finished and the service is idle.
const CODE_IDLE: &str = "0";

/// Fixed pacing of both handshake phases.
pub const HANDSHAKE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors raised by the narration handshake.
#[derive(Error, Debug)]
pub enum NarrationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The reply had no parsable `code` field.
    #[error("malformed handshake reply: {0}")]
    Shape(#[source] serde_json::Error),
    /// The configured `max_wait` elapsed before both phases completed.
    #[error("narration handshake still pending after {waited:?}")]
    DeadlineExceeded { waited: Duration },
    /// The cancellation flag tripped mid-handshake.
    #[error("narration handshake cancelled")]
    Cancelled,
}

/// Wire record pushed to the speech service. `text` is reserved by the
/// service and always sent empty.
#[derive(Serialize)]
struct SetDataRequest<'a> {
    scene: &'a str,
    intention: &'a str,
    content: &'a str,
    text: &'static str,
}

impl<'a> SetDataRequest<'a> {
    fn from_message(message: &'a NarrationMessage) -> Self {
        Self {
            scene: &message.scene,
            intention: &message.intention,
            content: &message.content,
            text: "",
        }
    }
}

/// Shape of both handshake replies; only `code` matters.
#[derive(Deserialize)]
struct HandshakeReply {
    code: String,
}

/// Blocking controller for the speech service.
///
/// Holds its own [`Transport`] because the speech service generally lives
/// on a different host/port than the action engine.
pub struct Narrator {
    link: Option<Box<dyn Transport>>,
    poll: PollPolicy,
}

impl Narrator {
    /// Narrator bound to a speech service with the default 500 ms
    /// unbounded poll.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            link: Some(transport),
            poll: PollPolicy::new(HANDSHAKE_POLL_INTERVAL),
        }
    }

    pub fn with_policy(transport: Box<dyn Transport>, poll: PollPolicy) -> Self {
        Self {
            link: Some(transport),
            poll,
        }
    }

    /// Narrator for a robot with no speech service configured. `speak`
    /// becomes a logged no-op.
    pub fn disabled() -> Self {
        Self {
            link: None,
            poll: PollPolicy::new(HANDSHAKE_POLL_INTERVAL),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.link.is_some()
    }

    /// Block until `message` has been accepted and played, or forever if
    /// the remote never reports the expected codes and the policy is
    /// unbounded.
    ///
    /// The `max_wait` deadline, when set, spans the whole handshake, both
    /// phases together.
    pub fn speak(&self, message: &NarrationMessage) -> Result<(), NarrationError> {
        let started = Instant::now();

        if let Some(link) = &self.link {
            self.push_until_accepted(link.as_ref(), message, started)?;
        }
        debug!(intention = %message.intention, "narration record delivered");

        if let Some(link) = &self.link {
            self.poll_until_idle(link.as_ref(), started)?;
        }
        debug!(intention = %message.intention, "narration playback finished");

        Ok(())
    }

    /// Phase 1: re-POST the identical record until the service accepts it.
    fn push_until_accepted(
        &self,
        link: &dyn Transport,
        message: &NarrationMessage,
        started: Instant,
    ) -> Result<(), NarrationError> {
        let payload = serde_json::to_value(SetDataRequest::from_message(message))
            .map_err(NarrationError::Shape)?;
        loop {
            let reply = link.post(SET_DATA_PATH, &payload)?;
            let reply: HandshakeReply =
                serde_json::from_value(reply).map_err(NarrationError::Shape)?;
            if reply.code == CODE_ACCEPTED {
                return Ok(());
            }
            trace!(code = %reply.code, "speech service busy, re-pushing");
            self.check_liveness(started)?;
            self.poll.pause();
        }
    }

    /// Phase 2: poll the status endpoint until playback has finished.
    fn poll_until_idle(&self, link: &dyn Transport, started: Instant) -> Result<(), NarrationError> {
        loop {
            let reply = link.get(GET_STATUS_PATH)?;
            let reply: HandshakeReply =
                serde_json::from_value(reply).map_err(NarrationError::Shape)?;
            if reply.code == CODE_IDLE {
                return Ok(());
            }
            trace!(code = %reply.code, "narration still playing");
            self.check_liveness(started)?;
            self.poll.pause();
        }
    }

    fn check_liveness(&self, started: Instant) -> Result<(), NarrationError> {
        if self.poll.cancelled() {
            return Err(NarrationError::Cancelled);
        }
        if self.poll.deadline_passed(started) {
            return Err(NarrationError::DeadlineExceeded {
                waited: started.elapsed(),
            });
        }
        Ok(())
    }
}
