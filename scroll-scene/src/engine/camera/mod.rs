//! Scroll-driven camera field of view.
//!
//! Eases each region's progress between its start and end field of view and
//! skips projection recomputation when progress has barely moved.

/// Field-of-view controller and the camera collaborator trait.
pub mod fov_controller;
