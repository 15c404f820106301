use bevy::prelude::*;

use crate::engine::scene::adapters::{PendingReleases, TrackedAsset};

/// Apply the asset removals and despawns recorded by lifecycle calls.
pub fn apply_pending_releases(
    mut pending: ResMut<PendingReleases>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if pending.assets.is_empty() && pending.despawn.is_empty() {
        return;
    }

    let released = pending.assets.len();
    for asset in pending.assets.drain(..) {
        match asset {
            TrackedAsset::Mesh(id) => {
                meshes.remove(id);
            }
            TrackedAsset::Material(id) => {
                materials.remove(id);
            }
        }
    }

    let despawned = pending.despawn.len();
    for entity in pending.despawn.drain(..) {
        commands.entity(entity).try_despawn();
    }

    debug!("Released {} assets, despawned {} entities", released, despawned);
}
