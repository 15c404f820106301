use bevy::prelude::*;

use crate::engine::scene::adapters::{ActiveScene, SceneWorld};

/// Release everything the scene registered when the app shuts down.
pub fn cleanup_on_exit(
    mut exits: EventReader<AppExit>,
    scene: Option<ResMut<ActiveScene>>,
    mut world: SceneWorld,
    mut commands: Commands,
) {
    if exits.is_empty() {
        return;
    }
    exits.clear();

    let Some(mut scene) = scene else {
        return;
    };
    let mut ports = world.ports();
    scene.cleanup_all(&mut ports.rig, &mut ports.resources, &mut ports.driver);
    commands.remove_resource::<ActiveScene>();
}
