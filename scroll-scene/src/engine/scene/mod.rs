//! Bevy side of the scene.
//!
//! Spawns the placeholder cell, product and starfield entities, and adapts
//! ECS queries and assets to the collaborator traits the core expects.

/// Trait implementations over Bevy queries, plus the scene resources they
/// write through.
pub mod adapters;

/// Marker components for scene entities.
pub mod components;

/// Startup spawning and two-phase scene context creation.
pub mod setup;
