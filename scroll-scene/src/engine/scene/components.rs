use bevy::prelude::*;

#[derive(Component)]
pub struct SceneCamera;

/// Organic cell geometry shown through the splash and zoom sections.
#[derive(Component)]
pub struct CellNode;

#[derive(Component)]
pub struct ProductNode;

#[derive(Component)]
pub struct StarfieldRoot;

/// Parent of one particle group; carries the group's scale and fade.
#[derive(Component)]
pub struct ParticleGroupRoot(pub usize);

/// Index into the particle pool.
#[derive(Component)]
pub struct ParticleIndex(pub usize);

#[derive(Component)]
pub struct IdleOverlay;
