//! Scroll position to region progress.
//!
//! `progress_mapper` is pure: offset + section measurements in, one clamped
//! progress value per region out. `scroll_controller` keeps the latest
//! measurements and the parked latch between ticks.

pub mod progress_mapper;
pub mod scroll_controller;
