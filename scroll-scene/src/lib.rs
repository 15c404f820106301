//! Scroll-driven coordination core for a product scene rendered with Bevy.
//!
//! The `engine` modules split into an engine-agnostic core (scroll mapping,
//! camera field of view, tween sequences, particles, activity tracking and
//! resource lifecycle) and the Bevy layer that implements the collaborator
//! traits over ECS queries. The `rpc` module bridges the host page.

pub mod engine;
pub mod rpc;

pub use engine::core::app_setup::create_app;
pub use engine::core::scene_context::SceneContext;
