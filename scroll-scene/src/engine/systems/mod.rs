//! Per-frame systems that drive the scene context from Bevy.

/// Host commands (scroll, measurements, activity, colour, lifecycle) and
/// the buffered scroll input.
pub mod scene_commands;

/// Scroll mapping, the gated render-loop tick and particle sync.
pub mod frame;

/// Deferred asset release and entity despawn after lifecycle calls.
pub mod releases;

/// Full cleanup when the app exits.
pub mod teardown;

/// Mouse wheel and keyboard stand-ins for the host page on native builds.
#[cfg(not(target_arch = "wasm32"))]
pub mod native_input;
