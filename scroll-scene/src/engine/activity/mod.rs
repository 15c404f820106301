//! Input activity tracking and render-loop suspension.

pub mod activity_monitor;
