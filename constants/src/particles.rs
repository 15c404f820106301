/// Total number of starfield particles
pub const PARTICLE_COUNT: usize = 1200;

/// Velocity multiplier per group. The group count is the length of this table.
/// Values are hand tuned so groups drift apart visibly over a few seconds.
pub const GROUP_VELOCITY_MULTIPLIERS: &[f32] = &[1.0, 1.4, 1.85, 2.3, 3.1];

/// Zoom progress at which each group explodes, indexed like the multipliers
pub const EXPLOSION_THRESHOLDS: &[f32] = &[0.12, 0.28, 0.44, 0.6, 0.76];

/// Group scale reached at the end of an explosion
pub const EXPLOSION_SCALE: f32 = 6.5;

/// Explosion duration (seconds)
pub const EXPLOSION_DURATION: f32 = 1.1;

/// Shared opacity fade used when the product section is entered or left (seconds)
pub const OPACITY_FADE_DURATION: f32 = 0.8;

/// Base particle speed in world units per frame
pub const BASE_PARTICLE_SPEED: f32 = 0.004;

/// Rendered particle radius (world units)
pub const PARTICLE_SIZE: f32 = 0.025;

/// Bound radius used when no bounding volume is available
pub const DEFAULT_BOUND_RADIUS: f32 = 8.0;

/// Bound radius as a multiple of the measured half-diagonal of the cell
pub const BOUND_RADIUS_FACTOR: f32 = 2.5;

/// Seed for particle placement
pub const PARTICLE_SEED: u64 = 0x5eed_ce11;
