use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::winit::{UpdateMode, WinitSettings};
use std::time::Duration;

use crate::engine::activity::activity_monitor::{FrameDriver, FrameHandle};
use crate::engine::camera::fov_controller::FovCamera;
use crate::engine::core::scene_context::SceneContext;
use crate::engine::lifecycle::registry::{ListenerKey, SceneResources};
use crate::engine::particles::particle_system::BoundingVolume;
use crate::engine::scene::components::{IdleOverlay, ProductNode, SceneCamera};
use crate::engine::tween::color_change::ProductRig;

/// GPU-resident assets the lifecycle manager tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedAsset {
    Mesh(AssetId<Mesh>),
    Material(AssetId<StandardMaterial>),
}

impl From<&Handle<Mesh>> for TrackedAsset {
    fn from(handle: &Handle<Mesh>) -> Self {
        Self::Mesh(handle.id())
    }
}

impl From<&Handle<StandardMaterial>> for TrackedAsset {
    fn from(handle: &Handle<StandardMaterial>) -> Self {
        Self::Material(handle.id())
    }
}

pub type BevySceneContext = SceneContext<TrackedAsset, Entity>;

/// The live scene. Absent while loading and after a full cleanup.
#[derive(Resource, Deref, DerefMut)]
pub struct ActiveScene(pub BevySceneContext);

/// Host-facing product controls, mirrored to the page over RPC.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductControls {
    pub scroll_locked: bool,
    pub controls_enabled: bool,
}

impl Default for ProductControls {
    fn default() -> Self {
        Self {
            scroll_locked: false,
            controls_enabled: true,
        }
    }
}

/// Render-loop requests made by the activity monitor.
#[derive(Resource, Debug, Clone)]
pub struct FrameRequests {
    pub next: u64,
    pub continuous: bool,
    pub redraw_requested: bool,
    pub overlay_visible: bool,
    /// Wake-up interval while suspended, so idle polling and queued host
    /// messages are still picked up.
    pub idle_wait: Duration,
}

impl Default for FrameRequests {
    fn default() -> Self {
        Self {
            next: 0,
            continuous: true,
            redraw_requested: false,
            overlay_visible: false,
            idle_wait: Duration::from_secs_f64(constants::activity::ACTIVITY_POLL_INTERVAL_SECS),
        }
    }
}

/// Releases recorded during a lifecycle call and applied afterwards, once the
/// borrows on the asset stores are gone.
#[derive(Resource, Debug, Default)]
pub struct PendingReleases {
    pub assets: Vec<TrackedAsset>,
    pub despawn: Vec<Entity>,
    pub listeners: Vec<ListenerKey>,
}

/// Mesh bounds queried once to size the particle sphere.
pub struct MeshBounds(pub Aabb);

impl BoundingVolume for MeshBounds {
    fn extents(&self) -> Option<(Vec3, Vec3)> {
        Some((Vec3::from(self.0.min()), Vec3::from(self.0.max())))
    }
}

/// Perspective camera. Writes bypass change detection so the projection is
/// only rebuilt when `update_projection` flags it.
pub struct BevyCamera<'a>(pub Mut<'a, Projection>);

impl FovCamera for BevyCamera<'_> {
    fn set_fov(&mut self, degrees: f32) {
        if let Projection::Perspective(perspective) = self.0.bypass_change_detection() {
            perspective.fov = degrees.to_radians();
        }
    }

    fn update_projection(&mut self) {
        self.0.set_changed();
    }
}

pub struct BevyProductRig<'a> {
    pub product: Option<(Mut<'a, Transform>, &'a MeshMaterial3d<StandardMaterial>)>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub controls: &'a mut ProductControls,
}

impl ProductRig for BevyProductRig<'_> {
    fn rotation(&self) -> Option<f32> {
        let (transform, _) = self.product.as_ref()?;
        let (tilt, _, _) = transform.rotation.to_euler(EulerRot::XYZ);
        Some(tilt)
    }

    fn set_rotation(&mut self, radians: f32) {
        if let Some((transform, _)) = self.product.as_mut() {
            transform.rotation = Quat::from_rotation_x(radians);
        }
    }

    fn height(&self) -> Option<f32> {
        self.product
            .as_ref()
            .map(|(transform, _)| transform.translation.y)
    }

    fn set_height(&mut self, height: f32) {
        if let Some((transform, _)) = self.product.as_mut() {
            transform.translation.y = height;
        }
    }

    fn color(&self) -> Option<[f32; 3]> {
        let (_, material) = self.product.as_ref()?;
        let color = self.materials.get(&material.0)?.base_color.to_linear();
        Some([color.red, color.green, color.blue])
    }

    fn set_color(&mut self, [red, green, blue]: [f32; 3]) {
        let Some((_, material)) = self.product.as_ref() else {
            return;
        };
        // Mutable access marks the asset modified, which re-uploads it.
        if let Some(material) = self.materials.get_mut(&material.0) {
            material.base_color = Color::linear_rgb(red, green, blue);
        }
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls.controls_enabled = enabled;
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.controls.scroll_locked = locked;
    }
}

pub type SceneVisibility<'w, 's> = Query<'w, 's, &'static mut Visibility, Without<IdleOverlay>>;

pub struct BevySceneResources<'a, 'w, 's> {
    pub visibility: &'a mut SceneVisibility<'w, 's>,
    pub pending: &'a mut PendingReleases,
}

impl SceneResources<TrackedAsset, Entity> for BevySceneResources<'_, '_, '_> {
    fn release_resource(&mut self, resource: &TrackedAsset) {
        self.pending.assets.push(*resource);
    }

    fn remove_listener(&mut self, listener: &ListenerKey) {
        self.pending.listeners.push(listener.clone());
    }

    fn node_visible(&self, node: &Entity) -> Option<bool> {
        self.visibility
            .get(*node)
            .ok()
            .map(|visibility| *visibility != Visibility::Hidden)
    }

    fn set_node_visible(&mut self, node: &Entity, visible: bool) {
        if let Ok(mut visibility) = self.visibility.get_mut(*node) {
            *visibility = if visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }

    fn despawn_node(&mut self, node: &Entity) {
        self.pending.despawn.push(*node);
    }
}

pub struct BevyFrameDriver<'a> {
    pub winit: &'a mut WinitSettings,
    pub frames: &'a mut FrameRequests,
}

impl FrameDriver for BevyFrameDriver<'_> {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.next += 1;
        if !self.frames.continuous {
            self.winit.focused_mode = UpdateMode::Continuous;
            self.winit.unfocused_mode = UpdateMode::Continuous;
            self.frames.continuous = true;
        }
        FrameHandle(self.frames.next)
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {
        if self.frames.continuous {
            let wait = self.frames.idle_wait;
            self.winit.focused_mode = UpdateMode::reactive(wait);
            self.winit.unfocused_mode = UpdateMode::reactive_low_power(wait);
            self.frames.continuous = false;
        }
    }

    fn animate(&mut self) {
        self.frames.redraw_requested = true;
    }

    fn set_idle_overlay(&mut self, visible: bool) {
        self.frames.overlay_visible = visible;
    }
}

/// Collaborators borrowed together for one context call.
pub struct ScenePorts<'a, 'w, 's> {
    pub camera: Option<BevyCamera<'a>>,
    pub rig: BevyProductRig<'a>,
    pub resources: BevySceneResources<'a, 'w, 's>,
    pub driver: BevyFrameDriver<'a>,
}

/// Everything the context's collaborators read and write.
#[derive(SystemParam)]
pub struct SceneWorld<'w, 's> {
    cameras: Query<'w, 's, &'static mut Projection, With<SceneCamera>>,
    product: Query<
        'w,
        's,
        (&'static mut Transform, &'static MeshMaterial3d<StandardMaterial>),
        With<ProductNode>,
    >,
    visibility: SceneVisibility<'w, 's>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    controls: ResMut<'w, ProductControls>,
    frames: ResMut<'w, FrameRequests>,
    winit: ResMut<'w, WinitSettings>,
    pending: ResMut<'w, PendingReleases>,
    time: Res<'w, Time>,
}

impl<'w, 's> SceneWorld<'w, 's> {
    pub fn now(&self) -> f64 {
        self.time.elapsed_secs_f64()
    }

    pub fn delta(&self) -> f32 {
        self.time.delta_secs()
    }

    pub fn ports(&mut self) -> ScenePorts<'_, 'w, 's> {
        ScenePorts {
            camera: self.cameras.single_mut().ok().map(BevyCamera),
            rig: BevyProductRig {
                product: self.product.single_mut().ok(),
                materials: &mut self.materials,
                controls: &mut self.controls,
            },
            resources: BevySceneResources {
                visibility: &mut self.visibility,
                pending: &mut self.pending,
            },
            driver: BevyFrameDriver {
                winit: &mut self.winit,
                frames: &mut self.frames,
            },
        }
    }
}
