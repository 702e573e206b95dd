//! Typed endpoints of the robot's action service.

use docent_types::{ActionHandle, ActionRequest, ActionStatus, PointOfInterest, Pose};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::transport::{Transport, TransportError};

const ACTIONS_PATH: &str = "/api/core/motion/v1/actions";
const POSE_PATH: &str = "/api/core/slam/v1/localization/pose";
const POIS_PATH: &str = "/api/core/artifact/v1/pois";

/// Errors raised by the typed API layer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// The remote answered with JSON that lacks an expected field
    /// (no `action_id`, no `state.status`, ...).
    #[error("malformed {what} response: {source}")]
    Shape {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of a localization query.
///
/// The pose endpoint answers with a non-JSON body while the robot is not
/// localized; the documented fallback is to answer the POI query instead,
/// so callers still get something to display.
#[derive(Debug, Clone)]
pub enum PoseReport {
    Localized(Pose),
    Unlocalized(Vec<PointOfInterest>),
}

/// Shape of the action-status poll response; only `state.status` matters.
#[derive(Deserialize)]
struct StatusEnvelope {
    state: ActionStatus,
}

/// Typed client for the action service, owning one bound [`Transport`].
pub struct RobotApi {
    transport: Box<dyn Transport>,
}

impl RobotApi {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Submit `request` to the action-creation endpoint and return the
    /// handle the engine issued for it.
    ///
    /// # Errors
    ///
    /// No retry on failure: a transport error or a response without an
    /// `action_id` propagates to the caller.
    pub fn create_action(&self, request: &ActionRequest) -> Result<ActionHandle, ApiError> {
        let body = serde_json::to_value(request).map_err(ApiError::Encode)?;
        let reply = self.transport.post(ACTIONS_PATH, &body)?;
        shaped(reply, "action creation")
    }

    /// Poll the current status of the action behind `handle`.
    pub fn action_status(&self, handle: &ActionHandle) -> Result<ActionStatus, ApiError> {
        let path = format!("{}/{}", ACTIONS_PATH, handle.action_id);
        let reply = self.transport.get(&path)?;
        let envelope: StatusEnvelope = shaped(reply, "action status")?;
        Ok(envelope.state)
    }

    /// Query the robot's current localization pose.
    ///
    /// When the pose endpoint answers with a non-JSON body the POI list is
    /// queried instead and returned as [`PoseReport::Unlocalized`]. Network
    /// failures still propagate.
    pub fn pose(&self) -> Result<PoseReport, ApiError> {
        match self.transport.get(POSE_PATH) {
            Ok(reply) => Ok(PoseReport::Localized(shaped(reply, "pose")?)),
            Err(TransportError::Decode(reason)) => {
                debug!(%reason, "pose endpoint not decodable; falling back to POI query");
                Ok(PoseReport::Unlocalized(self.pois()?))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List every point of interest on the current map.
    pub fn pois(&self) -> Result<Vec<PointOfInterest>, ApiError> {
        let reply = self.transport.get(POIS_PATH)?;
        shaped(reply, "POI list")
    }
}

fn shaped<T: serde::de::DeserializeOwned>(value: Value, what: &'static str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Shape { what, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted in-process transport: hands out queued replies and records
    /// every call it sees.
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Value, TransportError>>>,
        calls: Mutex<Vec<(&'static str, String)>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<Value, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn next(&self) -> Result<Value, TransportError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted transport ran out of replies")
        }

        fn calls(&self) -> Vec<(&'static str, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn post(&self, path: &str, _body: &Value) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(("POST", path.to_string()));
            self.next()
        }

        fn get(&self, path: &str) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(("GET", path.to_string()));
            self.next()
        }
    }

    fn api(replies: Vec<Result<Value, TransportError>>) -> (RobotApi, std::sync::Arc<ScriptedTransport>) {
        let transport = std::sync::Arc::new(ScriptedTransport::new(replies));
        (RobotApi::new(Box::new(ArcTransport(transport.clone()))), transport)
    }

    /// Lets a test keep a handle on the transport the API consumed.
    struct ArcTransport(std::sync::Arc<ScriptedTransport>);

    impl Transport for ArcTransport {
        fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
            self.0.post(path, body)
        }

        fn get(&self, path: &str) -> Result<Value, TransportError> {
            self.0.get(path)
        }
    }

    fn sample_pois() -> Value {
        json!([
            {"id": "p1", "metadata": {"display_name": "Pos1"}, "pose": {"x": 1.0, "y": 2.0, "yaw": 0.1}},
            {"id": "p2", "metadata": {"display_name": "Pos2"}, "pose": {"x": 3.0, "y": 4.0, "yaw": 0.2}}
        ])
    }

    #[test]
    fn create_action_extracts_the_issued_handle() {
        let (api, transport) = api(vec![Ok(json!({"action_id": "a-1", "stage": "GOING"}))]);
        let request = ActionRequest::Rotate(docent_types::RotateOptions { angle: 0.5 });
        let handle = api.create_action(&request).unwrap();
        assert_eq!(handle.action_id, "a-1");
        assert_eq!(transport.calls(), vec![("POST", ACTIONS_PATH.to_string())]);
    }

    #[test]
    fn create_action_without_action_id_is_a_shape_error() {
        let (api, _) = api(vec![Ok(json!({"error": "unknown action"}))]);
        let request = ActionRequest::Rotate(docent_types::RotateOptions { angle: 0.5 });
        let err = api.create_action(&request).unwrap_err();
        assert!(matches!(err, ApiError::Shape { what: "action creation", .. }));
    }

    #[test]
    fn action_status_reads_the_nested_state() {
        let (api, transport) = api(vec![Ok(json!({"state": {"status": 4}, "stage": "DONE"}))]);
        let handle = ActionHandle { action_id: "a-9".to_string() };
        let status = api.action_status(&handle).unwrap();
        assert!(status.is_ended());
        assert_eq!(
            transport.calls(),
            vec![("GET", format!("{ACTIONS_PATH}/a-9"))]
        );
    }

    #[test]
    fn pose_decodes_when_localized() {
        let (api, _) = api(vec![Ok(json!({"x": 0.5, "y": -0.5, "z": 0.0, "yaw": 3.1}))]);
        match api.pose().unwrap() {
            PoseReport::Localized(pose) => assert_eq!(pose.yaw, 3.1),
            PoseReport::Unlocalized(_) => panic!("expected a localized pose"),
        }
    }

    #[test]
    fn pose_falls_back_to_poi_query_on_decode_failure() {
        let (api, transport) = api(vec![
            Err(TransportError::Decode("expected value at line 1".to_string())),
            Ok(sample_pois()),
        ]);
        match api.pose().unwrap() {
            PoseReport::Unlocalized(pois) => {
                assert_eq!(pois.len(), 2);
                assert_eq!(pois[0].id, "p1");
            }
            PoseReport::Localized(_) => panic!("expected the POI fallback"),
        }
        assert_eq!(
            transport.calls(),
            vec![("GET", POSE_PATH.to_string()), ("GET", POIS_PATH.to_string())]
        );
    }

    #[test]
    fn pose_fallback_matches_direct_poi_query() {
        let (fallback_api, _) = api(vec![
            Err(TransportError::Decode("bad body".to_string())),
            Ok(sample_pois()),
        ]);
        let (direct_api, _) = api(vec![Ok(sample_pois())]);

        let via_fallback = match fallback_api.pose().unwrap() {
            PoseReport::Unlocalized(pois) => pois,
            PoseReport::Localized(_) => panic!("expected the POI fallback"),
        };
        let direct = direct_api.pois().unwrap();

        let ids = |pois: &[PointOfInterest]| pois.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&via_fallback), ids(&direct));
    }
}
