//! `docent-runtime` – Tour orchestration
//!
//! Sequences the whole tour: dock, then for every point of interest in
//! deterministic order move there and narrate, then dock again. Owns the
//! handles to every subsystem it drives and blocks on each step; data only
//! ever flows downward, orchestrator → behaviors → engine → transport.
//!
//! # Modules
//!
//! - [`script`] – [`TourScript`][script::TourScript]: pre-authored narration
//!   keyed by POI id, validated against the fetched map before any motion
//!   starts.
//! - [`tour`] – [`TourRunner`][tour::TourRunner]: the
//!   `dock → (move, speak)* → dock` sequence over the waypoints sorted by
//!   display name.

pub mod script;
pub mod tour;

pub use script::{ScriptEntry, TourScript};
pub use tour::{TourError, TourRunner, sort_waypoints};
