use bevy::prelude::*;
use bevy::window::RequestRedraw;

use crate::engine::scene::adapters::{ActiveScene, FrameRequests, ProductControls, SceneWorld};
use crate::engine::scene::components::{IdleOverlay, ParticleGroupRoot, ParticleIndex};
use crate::engine::systems::scene_commands::{ScrollInput, notify_activity, notify_group};
use crate::rpc::web_rpc::WebRpcInterface;

/// Push buffered measurements and the latest offset through the context.
pub fn apply_scroll(
    scene: Option<ResMut<ActiveScene>>,
    mut scroll_input: ResMut<ScrollInput>,
    mut world: SceneWorld,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(mut scene) = scene else {
        return;
    };

    if scroll_input.regions_dirty {
        scroll_input.regions_dirty = false;
        match scene.measure_regions(scroll_input.regions.clone()) {
            // New measurements move every window; re-map the current offset.
            Ok(()) => scroll_input.offset_dirty = true,
            Err(error) => warn!("Ignoring section measurements: {}", error),
        }
    }

    if !scroll_input.offset_dirty || scroll_input.viewport_height <= 0.0 {
        return;
    }
    scroll_input.offset_dirty = false;

    let now = world.now();
    let Some(mut camera) = world.ports().camera else {
        return;
    };
    let Some(outcome) = scene.on_scroll(
        scroll_input.offset,
        scroll_input.viewport_height,
        now,
        &mut camera,
    ) else {
        return;
    };

    if let Some(transition) = outcome.transition {
        rpc_interface.send_notification(
            "region_changed",
            serde_json::json!({
                "from": transition.from,
                "to": transition.to,
                "parked": outcome.snapshot.parked,
            }),
        );
    }
    if !outcome.exploded_groups.is_empty() {
        rpc_interface.send_notification(
            "particles_exploded",
            serde_json::json!({ "groups": outcome.exploded_groups }),
        );
    }
}

/// One render-loop tick of the context.
pub fn advance_scene(
    scene: Option<ResMut<ActiveScene>>,
    mut world: SceneWorld,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(mut scene) = scene else {
        return;
    };

    let now = world.now();
    let dt = world.delta();
    let mut ports = world.ports();
    let report = scene.run_frame(
        now,
        dt,
        &mut ports.rig,
        &mut ports.resources,
        &mut ports.driver,
    );

    notify_activity(&mut rpc_interface, report.activity);
    if let Some(color) = report.color_completed {
        rpc_interface.send_notification(
            "color_change_completed",
            serde_json::json!({
                "color": color,
                "name": scene.palette_color(&color).map_or("unknown", |entry| entry.name.as_str()),
            }),
        );
    }
    for (group, intent) in report.lifecycle {
        notify_group(&mut rpc_interface, &group, intent);
    }
}

/// Copy particle positions, group scale, visibility and fade onto entities.
pub fn sync_particles(
    scene: Option<Res<ActiveScene>>,
    mut particles: Query<(&ParticleIndex, &mut Transform)>,
    mut groups: Query<
        (
            &ParticleGroupRoot,
            &mut Transform,
            &mut Visibility,
            &MeshMaterial3d<StandardMaterial>,
        ),
        Without<ParticleIndex>,
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(scene) = scene else {
        return;
    };
    if scene.activity().is_suspended() {
        return;
    }
    let system = scene.particles();

    for (index, mut transform) in &mut particles {
        if let Some(particle) = system.particles().get(index.0) {
            if transform.translation != particle.position {
                transform.translation = particle.position;
            }
        }
    }

    for (root, mut transform, mut visibility, material) in &mut groups {
        let Some(group) = system.group(root.0) else {
            continue;
        };
        transform.scale = Vec3::splat(group.scale());
        visibility.set_if_neq(if group.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });

        let alpha = system.group_opacity(root.0);
        let stale = materials
            .get(&material.0)
            .is_some_and(|m| (m.base_color.alpha() - alpha).abs() > f32::EPSILON);
        if stale {
            if let Some(material) = materials.get_mut(&material.0) {
                material.base_color.set_alpha(alpha);
            }
        }
    }
}

/// Turn the activity monitor's requests into redraws and overlay visibility.
pub fn apply_frame_requests(
    mut frames: ResMut<FrameRequests>,
    mut redraws: EventWriter<RequestRedraw>,
    mut overlays: Query<&mut Visibility, With<IdleOverlay>>,
) {
    if frames.redraw_requested {
        frames.redraw_requested = false;
        redraws.write(RequestRedraw);
    }

    let target = if frames.overlay_visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut overlays {
        visibility.set_if_neq(target);
    }
}

/// Mirror scroll lock and swatch availability to the host page.
pub fn notify_product_controls(
    controls: Res<ProductControls>,
    mut last_sent: Local<Option<ProductControls>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if last_sent.is_none() {
        *last_sent = Some(*controls);
        return;
    }
    if *last_sent == Some(*controls) {
        return;
    }
    *last_sent = Some(*controls);

    rpc_interface.send_notification(
        "scroll_lock_changed",
        serde_json::json!({
            "locked": controls.scroll_locked,
            "controls_enabled": controls.controls_enabled,
        }),
    );
}
