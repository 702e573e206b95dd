//! `docent-motion` – Action lifecycle control
//!
//! Submits motion actions to the remote action engine and blocks until each
//! one reaches its terminal state. This is the only layer that knows an
//! action has a lifecycle at all; everything above it just calls a behavior
//! and gets control back when the robot has stopped moving.
//!
//! # Modules
//!
//! - [`engine`] – [`ActionEngine`][engine::ActionEngine]: submit an
//!   [`ActionRequest`][docent_types::ActionRequest], obtain the issued
//!   [`ActionHandle`][docent_types::ActionHandle], and spin-poll its status
//!   at a fixed interval until the terminal code is observed. Unbounded by
//!   default; a [`PollPolicy`][docent_types::PollPolicy] can bound the wait
//!   or wire in a cancellation flag.
//! - [`behavior`] – the three semantic behaviors composed from `execute`:
//!   dock ([`go_home`][engine::ActionEngine::go_home]), rotate in place
//!   ([`rotate`][engine::ActionEngine::rotate]), and translate-then-reorient
//!   ([`move_to`][engine::ActionEngine::move_to]).

pub mod behavior;
pub mod engine;

pub use engine::{ACTION_POLL_INTERVAL, ActionEngine, MotionError};
