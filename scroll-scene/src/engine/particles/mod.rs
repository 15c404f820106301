//! Starfield particle pool with per-group explosions.

pub mod particle_system;
