use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;

use constants::render_settings::{
    AMBIENT_BRIGHTNESS, CAMERA_POSITION, CELL_COLOR, CELL_RADIUS, CLEAR_COLOR, PARTICLE_COLOR,
    PRODUCT_DIMENSIONS,
};
use constants::scroll::{CELL_GROUP, PRODUCT_GROUP};

use crate::engine::core::scene_context::SceneContext;
use crate::engine::lifecycle::registry::GroupMode;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_config::SceneConfig;
use crate::engine::particles::particle_system::BoundingVolume;
use crate::engine::scene::adapters::{ActiveScene, MeshBounds, SceneWorld, TrackedAsset};
use crate::engine::scene::components::{
    CellNode, IdleOverlay, ParticleGroupRoot, ParticleIndex, ProductNode, SceneCamera,
    StarfieldRoot,
};
use crate::engine::systems::scene_commands::ScrollInput;
use crate::rpc::web_rpc::TrackedListeners;

// Startup system that only handles camera, lighting and overlays
pub fn setup(mut commands: Commands) {
    commands.insert_resource(ClearColor(CLEAR_COLOR));
    commands.insert_resource(AmbientLight {
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: constants::scroll::DEFAULT_FOV_DEGREES.to_radians(),
            ..default()
        }),
        Transform::from_translation(Vec3::from_array(CAMERA_POSITION))
            .looking_at(Vec3::ZERO, Vec3::Y),
        SceneCamera,
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            0.6,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));

    create_idle_overlay(&mut commands);
}

fn create_idle_overlay(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.35)),
            Visibility::Hidden,
            IdleOverlay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Paused. Move or scroll to continue."),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.95)),
            ));
        });
}

/// First phase: once the config is available, spawn the placeholder scene
/// and build the context around it.
pub fn create_scene_when_ready(
    mut commands: Commands,
    loading_progress: Res<LoadingProgress>,
    config: Option<Res<SceneConfig>>,
    existing: Option<Res<ActiveScene>>,
    tracked_listeners: Res<TrackedListeners>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    time: Res<Time>,
) {
    if loading_progress.scene_created || existing.is_some() {
        return;
    }
    let Some(config) = config else {
        return;
    };

    let cell_mesh = Sphere::new(CELL_RADIUS).mesh().uv(48, 24);
    let bounds = cell_mesh.compute_aabb().map(MeshBounds);
    let mut context = SceneContext::create(
        &config,
        bounds.as_ref().map(|b| b as &dyn BoundingVolume),
        time.elapsed_secs_f64(),
    );

    // Cell
    let cell_mesh = meshes.add(cell_mesh);
    let cell_material = materials.add(StandardMaterial {
        base_color: CELL_COLOR,
        perceptual_roughness: 0.55,
        ..default()
    });
    let cell = commands
        .spawn((
            Mesh3d(cell_mesh.clone()),
            MeshMaterial3d(cell_material.clone()),
            Transform::default(),
            Visibility::Inherited,
            CellNode,
        ))
        .id();

    // Product
    let product_rgb = config.initial_color().map_or([1.0; 3], |entry| entry.rgb);
    let (radius, half_length) = PRODUCT_DIMENSIONS;
    let product_mesh = meshes.add(Capsule3d::new(radius, half_length * 2.0));
    let product_material = materials.add(StandardMaterial {
        base_color: Color::linear_rgb(product_rgb[0], product_rgb[1], product_rgb[2]),
        metallic: 0.2,
        perceptual_roughness: 0.35,
        ..default()
    });
    let product = commands
        .spawn((
            Mesh3d(product_mesh.clone()),
            MeshMaterial3d(product_material.clone()),
            Transform::default(),
            Visibility::Inherited,
            ProductNode,
        ))
        .id();

    // Starfield
    let particle_mesh = meshes.add(Sphere::new(config.particles.particle_size).mesh().uv(6, 4));
    let mut particle_assets = vec![TrackedAsset::from(&particle_mesh)];
    let starfield = commands
        .spawn((Transform::default(), Visibility::Inherited, StarfieldRoot))
        .id();

    let particles = context.particles();
    for (group_id, group) in particles.groups().iter().enumerate() {
        let group_material = materials.add(StandardMaterial {
            base_color: PARTICLE_COLOR,
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        particle_assets.push(TrackedAsset::from(&group_material));

        let group_root = commands
            .spawn((
                Transform::default(),
                Visibility::Inherited,
                MeshMaterial3d(group_material.clone()),
                ParticleGroupRoot(group_id),
            ))
            .with_children(|parent| {
                for &index in group.members() {
                    parent.spawn((
                        Mesh3d(particle_mesh.clone()),
                        MeshMaterial3d(group_material.clone()),
                        Transform::from_translation(particles.particles()[index].position),
                        ParticleIndex(index),
                    ));
                }
            })
            .id();
        commands.entity(starfield).add_child(group_root);
    }

    let lifecycle = context.lifecycle_mut();
    lifecycle.register_group(
        CELL_GROUP,
        GroupMode::Hide,
        vec![cell, starfield],
        vec![
            TrackedAsset::from(&cell_mesh),
            TrackedAsset::from(&cell_material),
        ],
    );
    lifecycle.register_group(
        PRODUCT_GROUP,
        GroupMode::Hide,
        vec![product],
        vec![
            TrackedAsset::from(&product_mesh),
            TrackedAsset::from(&product_material),
        ],
    );
    for asset in particle_assets {
        lifecycle.track_resource(asset);
    }
    for listener in &tracked_listeners.0 {
        lifecycle.track_listener(listener.clone());
    }

    info!(
        "Scene spawned: {} particles, bound radius {:.2}",
        context.particles().particles().len(),
        context.particles().bound_radius()
    );
    commands.insert_resource(ActiveScene(context));
}

/// Second phase, after the spawned entities exist: hide the product until
/// its section is reached and arm the render loop.
pub fn start_scene(
    scene: Option<ResMut<ActiveScene>>,
    mut loading_progress: ResMut<LoadingProgress>,
    mut scroll_input: ResMut<ScrollInput>,
    mut world: SceneWorld,
) {
    if loading_progress.scene_created {
        return;
    }
    let Some(mut scene) = scene else {
        return;
    };

    let mut ports = world.ports();
    if let Err(error) = scene.dispose_group(PRODUCT_GROUP, &mut ports.resources) {
        warn!("Could not hide product at startup: {}", error);
    }
    scene.start(&mut ports.driver);

    // Replay whatever the host reported while the config was loading.
    scroll_input.regions_dirty = !scroll_input.regions.is_empty();
    scroll_input.offset_dirty = true;

    loading_progress.scene_created = true;
    info!("Scene started");
}
