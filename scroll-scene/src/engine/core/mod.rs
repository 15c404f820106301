//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and the scene context that owns every scroll-driven controller.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with asset loading, scene systems, the RPC bridge
/// and platform-specific configurations.
pub mod app_setup;

/// Application state machine and loading transitions.
pub mod app_state;

/// Error values returned by scene lookups and measurements.
pub mod error;

/// Context object owning scroll, camera, sequence, particle, activity and
/// lifecycle state for one scene.
///
/// Created in a second phase once the configuration asset has resolved.
pub mod scene_context;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
