//! `docent-client` – HTTP access to the robot
//!
//! The lowest layer that touches the network. Everything above it (the
//! action engine, the narration controller, the tour runner) talks to the
//! robot exclusively through these types.
//!
//! # Modules
//!
//! - [`transport`] – [`Transport`][transport::Transport]: the GET/POST seam
//!   bound to one [`RobotIdentity`][docent_types::RobotIdentity], plus
//!   [`HttpTransport`][transport::HttpTransport], its blocking reqwest
//!   implementation. A response body that is not valid JSON is reported as
//!   a typed decode failure, never a panic.
//! - [`api`] – [`RobotApi`][api::RobotApi]: the typed endpoints of the
//!   action service (create action, poll action status, localization pose
//!   with its POI-query fallback, list POIs).

pub mod api;
pub mod transport;

pub use api::{ApiError, PoseReport, RobotApi};
pub use transport::{HttpTransport, Transport, TransportError};
