//! Tween primitives and chained tween sequences.

/// Easing curves shared by camera, particle and sequence tweens.
pub mod easing;

/// Single-value tween advanced by frame delta.
pub mod tween;

/// Ordered multi-step tween chains with completion events.
pub mod sequence;

/// Product colour-change state machine built on `sequence`.
pub mod color_change;
