//! Scene configuration loading and startup progress.
//!
//! The JSON config is the only asset the scene waits for; once it resolves
//! (or fails and falls back to defaults) the scene entities and the
//! `SceneContext` are created.

/// JSON scene configuration asset with defaults from the constants crate.
pub mod scene_config;

/// Config asset request and resolution, with a default fallback on failure.
pub mod config_loader;

/// Loading progress flags consumed by state transitions.
pub mod progress;
