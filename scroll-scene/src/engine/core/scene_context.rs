use bevy::log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::Hash;

use constants::scroll::{CELL_GROUP, PRODUCT_GROUP};

use crate::engine::activity::activity_monitor::{ActivityMonitor, ActivityTransition, FrameDriver};
use crate::engine::camera::fov_controller::{FovCamera, FovController};
use crate::engine::core::error::SceneError;
use crate::engine::lifecycle::registry::{
    CleanupReport, LifecycleIntent, ResourceLifecycleManager, SceneResources,
};
use crate::engine::loading::scene_config::{PaletteEntry, SceneConfig};
use crate::engine::particles::particle_system::{BoundingVolume, ParticleSystem};
use crate::engine::scroll::progress_mapper::{ProgressSnapshot, RegionName, ScrollRegion};
use crate::engine::scroll::scroll_controller::{RegionTransition, ScrollController};
use crate::engine::tween::color_change::{ColorChangePhase, ColorChangeSequencer, ProductRig};

/// What one scroll tick changed downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOutcome {
    pub snapshot: ProgressSnapshot,
    pub transition: Option<RegionTransition>,
    pub fov_updated: bool,
    pub exploded_groups: Vec<usize>,
    /// `Some(true)` when the product section was entered on this tick,
    /// `Some(false)` when it was left.
    pub product_revealed: Option<bool>,
}

/// What one render-loop tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Scene work ran; `false` while suspended.
    pub ran: bool,
    pub activity: Option<ActivityTransition>,
    pub color_completed: Option<String>,
    pub lifecycle: Vec<(String, LifecycleIntent)>,
}

/// Serializable view of the scene for the host page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneState {
    pub active_region: Option<RegionName>,
    pub parked: bool,
    pub progress: BTreeMap<RegionName, f32>,
    pub projection_updates: u64,
    pub color_phase: ColorChangePhase,
    pub settled_color: String,
    pub pending_color: Option<String>,
    pub animating: bool,
    pub suspended: bool,
    pub product_visible: bool,
    pub disposed_groups: Vec<String>,
    pub particle_opacity: f32,
    pub exploded_groups: usize,
}

/// One scene's worth of coordination state.
///
/// Owns every controller and is the single entry point for scroll, input,
/// colour and lifecycle calls. `R` is the engine's resource handle type and
/// `N` its node id type.
#[derive(Debug)]
pub struct SceneContext<R, N> {
    scroll: ScrollController,
    fov: FovController,
    color: ColorChangeSequencer,
    particles: ParticleSystem,
    activity: ActivityMonitor,
    lifecycle: ResourceLifecycleManager<R, N>,
    palette: Vec<PaletteEntry>,
    fade_duration: f32,
    product_visible: bool,
}

impl<R, N> SceneContext<R, N>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    /// Second phase of scene creation, called once the configuration is
    /// loaded and the cell's bounding volume can be queried.
    pub fn create(config: &SceneConfig, bounds: Option<&dyn BoundingVolume>, now: f64) -> Self {
        let settled = config
            .initial_color()
            .map_or_else(|| config.default_color.clone(), |entry| entry.id.clone());

        let mut particles = ParticleSystem::new(config.particles.clone());
        if let Some(volume) = bounds {
            particles.fit_bounds(volume);
        }

        info!(
            "Scene context created: {} particles in {} groups, colour '{}'",
            particles.particles().len(),
            particles.groups().len(),
            settled
        );

        Self {
            scroll: ScrollController::new(),
            fov: config.fov.controller(),
            color: ColorChangeSequencer::new(settled, config.sequence),
            particles,
            activity: ActivityMonitor::new(now, config.activity),
            lifecycle: ResourceLifecycleManager::new(config.dispose_debounce),
            palette: config.palette.clone(),
            fade_duration: config.particles.fade_duration,
            product_visible: false,
        }
    }

    /// Arm the render loop.
    pub fn start<D: FrameDriver>(&mut self, driver: &mut D) {
        self.activity.start(driver);
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn fov(&self) -> &FovController {
        &self.fov
    }

    pub fn color(&self) -> &ColorChangeSequencer {
        &self.color
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn activity(&self) -> &ActivityMonitor {
        &self.activity
    }

    pub fn lifecycle(&self) -> &ResourceLifecycleManager<R, N> {
        &self.lifecycle
    }

    /// Registration during setup.
    pub fn lifecycle_mut(&mut self) -> &mut ResourceLifecycleManager<R, N> {
        &mut self.lifecycle
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    pub fn product_visible(&self) -> bool {
        self.product_visible
    }

    pub fn palette_color(&self, color_id: &str) -> Result<&PaletteEntry, SceneError> {
        self.palette
            .iter()
            .find(|entry| entry.id == color_id)
            .ok_or_else(|| SceneError::UnknownColor(color_id.to_string()))
    }

    /// Replace the section measurements.
    pub fn measure_regions(&mut self, regions: Vec<ScrollRegion>) -> Result<(), SceneError> {
        let count = regions.len();
        self.scroll.set_regions(regions)?;
        info!("Measured {} scroll regions", count);
        Ok(())
    }

    /// Map a scroll offset onto the camera, the starfield and the section
    /// groups. Returns `None` when nothing downstream needs to change.
    pub fn on_scroll<C: FovCamera>(
        &mut self,
        offset: f32,
        viewport_height: f32,
        now: f64,
        camera: &mut C,
    ) -> Option<ScrollOutcome> {
        let update = self.scroll.on_scroll(offset, viewport_height)?;
        let snapshot = update.snapshot;
        let mut fov_updated = false;

        // Settle the region just left on its end value before the new one takes over.
        if let Some(RegionTransition {
            from: Some(exited),
            to,
        }) = update.transition
        {
            if to != Some(exited) {
                if let Some(progress) = snapshot.progress(exited) {
                    fov_updated |= self.fov.apply(exited, progress, camera);
                }
            }
        }

        if let Some((region, progress)) = snapshot.active_progress() {
            fov_updated |= self.fov.apply(region, progress, camera);
        }

        let exploded_groups = self.update_starfield(&snapshot);
        let product_revealed = self.update_sections(&snapshot, now);

        Some(ScrollOutcome {
            snapshot,
            transition: update.transition,
            fov_updated,
            exploded_groups,
            product_revealed,
        })
    }

    fn update_starfield(&mut self, snapshot: &ProgressSnapshot) -> Vec<usize> {
        match snapshot.progress(RegionName::Zoom) {
            Some(progress) if progress > 0.0 => self.particles.trigger_explosions(progress),
            Some(_) => {
                if self.particles.any_exploded() {
                    self.particles.randomize_positions();
                    self.particles.tween_opacity(1.0, self.fade_duration);
                    info!("Starfield restored at the top of the zoom section");
                }
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn update_sections(&mut self, snapshot: &ProgressSnapshot, now: f64) -> Option<bool> {
        let show_product = snapshot.parked || snapshot.active == Some(RegionName::Pitch);
        if show_product == self.product_visible {
            return None;
        }
        self.product_visible = show_product;

        let (cell, product, opacity) = if show_product {
            (LifecycleIntent::Dispose, LifecycleIntent::Reinstate, 0.0)
        } else {
            (LifecycleIntent::Reinstate, LifecycleIntent::Dispose, 1.0)
        };
        for (group, intent) in [(CELL_GROUP, cell), (PRODUCT_GROUP, product)] {
            if let Err(error) = self.lifecycle.request(group, intent, now) {
                debug!("Skipping section request: {}", error);
            }
        }
        self.particles.tween_opacity(opacity, self.fade_duration);

        info!(
            "Product section {}",
            if show_product { "entered" } else { "left" }
        );
        Some(show_product)
    }

    pub fn on_pointer_activity<D: FrameDriver>(
        &mut self,
        now: f64,
        driver: &mut D,
    ) -> Option<ActivityTransition> {
        self.activity.track_activity(now, driver)
    }

    pub fn on_scroll_activity<D: FrameDriver>(
        &mut self,
        now: f64,
        driver: &mut D,
    ) -> Option<ActivityTransition> {
        self.activity.track_activity(now, driver)
    }

    /// Whether `trigger_color_change` would start a sequence right now.
    pub fn can_change_color(&self, color_id: &str) -> Result<bool, SceneError> {
        self.palette_color(color_id)?;
        Ok(!self.color.is_animating() && self.color.settled_color() != color_id)
    }

    /// Start the colour-change sequence. `Ok(false)` means the request was
    /// ignored (already running or already that colour).
    pub fn trigger_color_change<Rg: ProductRig>(
        &mut self,
        color_id: &str,
        rig: &mut Rg,
    ) -> Result<bool, SceneError> {
        let rgb = self.palette_color(color_id)?.rgb;
        Ok(self.color.start(color_id, rgb, rig))
    }

    pub fn dispose_group<S: SceneResources<R, N>>(
        &mut self,
        name: &str,
        resources: &mut S,
    ) -> Result<bool, SceneError> {
        self.lifecycle.dispose(name, resources)
    }

    pub fn reinstate_group<S: SceneResources<R, N>>(
        &mut self,
        name: &str,
        resources: &mut S,
    ) -> Result<bool, SceneError> {
        self.lifecycle.reinstate(name, resources)
    }

    /// Debounced variant of dispose/reinstate, applied by `run_frame`.
    pub fn request_group(
        &mut self,
        name: &str,
        intent: LifecycleIntent,
        now: f64,
    ) -> Result<(), SceneError> {
        self.lifecycle.request(name, intent, now)
    }

    /// Tear everything down: stop the loop, release the product controls
    /// and drain the registry.
    pub fn cleanup_all<Rg, S, D>(
        &mut self,
        rig: &mut Rg,
        resources: &mut S,
        driver: &mut D,
    ) -> CleanupReport
    where
        Rg: ProductRig,
        S: SceneResources<R, N>,
        D: FrameDriver,
    {
        self.activity.stop(driver);
        self.color.cancel(rig);
        let report = self.lifecycle.cleanup_all(resources);
        info!(
            "Scene cleaned up: {} resources, {} listeners, {} nodes",
            report.resources, report.listeners, report.nodes
        );
        report
    }

    /// Per-frame scene work: particle motion, tweens and the colour sequence.
    pub fn advance<Rg: ProductRig>(&mut self, dt: f32, rig: &mut Rg) -> Option<String> {
        self.particles.update();
        self.particles.tick(dt);
        self.color.advance(dt, rig)
    }

    /// One render-loop tick: the idle check, the gated frame and any
    /// debounced lifecycle requests that came due.
    pub fn run_frame<Rg, S, D>(
        &mut self,
        now: f64,
        dt: f32,
        rig: &mut Rg,
        resources: &mut S,
        driver: &mut D,
    ) -> FrameReport
    where
        Rg: ProductRig,
        S: SceneResources<R, N>,
        D: FrameDriver,
    {
        let mut report = FrameReport {
            activity: self.activity.poll(now, driver),
            ..Default::default()
        };

        if let Some(handle) = self.activity.pending_frame() {
            if self.activity.on_frame(handle, driver) {
                report.ran = true;
                report.color_completed = self.advance(dt, rig);
            }
        }

        report.lifecycle = self.lifecycle.flush(now, resources);
        report
    }

    pub fn state_summary(&self) -> SceneState {
        let snapshot = self.scroll.last_snapshot().copied().unwrap_or_default();
        SceneState {
            active_region: snapshot.active,
            parked: snapshot.parked,
            progress: snapshot.iter().collect(),
            projection_updates: self.fov.projection_updates(),
            color_phase: self.color.phase(),
            settled_color: self.color.settled_color().to_string(),
            pending_color: self.color.pending_color().map(str::to_string),
            animating: self.color.is_animating(),
            suspended: self.activity.is_suspended(),
            product_visible: self.product_visible,
            disposed_groups: self.lifecycle.disposed_groups(),
            particle_opacity: self.particles.opacity(),
            exploded_groups: self
                .particles
                .groups()
                .iter()
                .filter(|group| group.has_exploded())
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::activity::activity_monitor::FrameHandle;
    use crate::engine::lifecycle::registry::{GroupMode, ListenerKey};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Camera {
        fov: f32,
        updates: usize,
    }

    impl FovCamera for Camera {
        fn set_fov(&mut self, degrees: f32) {
            self.fov = degrees;
        }
        fn update_projection(&mut self) {
            self.updates += 1;
        }
    }

    #[derive(Default)]
    struct Driver {
        next: u64,
        animations: usize,
    }

    impl FrameDriver for Driver {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            FrameHandle(self.next)
        }
        fn cancel_frame(&mut self, _handle: FrameHandle) {}
        fn animate(&mut self) {
            self.animations += 1;
        }
        fn set_idle_overlay(&mut self, _visible: bool) {}
    }

    #[derive(Default)]
    struct Rig {
        color: [f32; 3],
        locked: bool,
    }

    impl ProductRig for Rig {
        fn rotation(&self) -> Option<f32> {
            Some(0.0)
        }
        fn set_rotation(&mut self, _radians: f32) {}
        fn height(&self) -> Option<f32> {
            Some(0.0)
        }
        fn set_height(&mut self, _height: f32) {}
        fn color(&self) -> Option<[f32; 3]> {
            Some(self.color)
        }
        fn set_color(&mut self, rgb: [f32; 3]) {
            self.color = rgb;
        }
        fn set_controls_enabled(&mut self, _enabled: bool) {}
        fn set_scroll_locked(&mut self, locked: bool) {
            self.locked = locked;
        }
    }

    #[derive(Default)]
    struct Nodes {
        visible: HashMap<u32, bool>,
        released: Vec<u8>,
    }

    impl SceneResources<u8, u32> for Nodes {
        fn release_resource(&mut self, resource: &u8) {
            self.released.push(*resource);
        }
        fn remove_listener(&mut self, _listener: &ListenerKey) {}
        fn node_visible(&self, node: &u32) -> Option<bool> {
            self.visible.get(node).copied()
        }
        fn set_node_visible(&mut self, node: &u32, visible: bool) {
            self.visible.insert(*node, visible);
        }
        fn despawn_node(&mut self, node: &u32) {
            self.visible.remove(node);
        }
    }

    fn context() -> SceneContext<u8, u32> {
        let mut config = SceneConfig::default();
        config.particles.count = 50;
        let mut context = SceneContext::create(&config, None, 0.0);
        context
            .measure_regions(vec![
                ScrollRegion::new(RegionName::Splash, 0.0, 900.0),
                ScrollRegion::new(RegionName::Zoom, 900.0, 2700.0),
                ScrollRegion::new(RegionName::ZoomOut, 2700.0, 4200.0),
                ScrollRegion::new(RegionName::Pitch, 4200.0, 5400.0),
            ])
            .unwrap();
        context
    }

    #[test]
    fn zoom_progress_drives_camera_and_explosions() {
        let mut context = context();
        let mut camera = Camera::default();

        // Zoom window is [0, 1800] with a 900px viewport.
        let outcome = context.on_scroll(900.0, 900.0, 0.0, &mut camera).unwrap();
        assert_eq!(outcome.snapshot.active, Some(RegionName::Zoom));
        assert!(outcome.fov_updated);
        assert!((camera.fov - 31.0).abs() < 1e-4);
        assert_eq!(outcome.exploded_groups, vec![0, 1, 2]);
    }

    #[test]
    fn returning_to_zoom_start_restores_starfield() {
        let mut context = context();
        let mut camera = Camera::default();
        context.on_scroll(1700.0, 900.0, 0.0, &mut camera);
        assert!(context.particles().any_exploded());

        // Splash wins the shared boundary at offset 0, zoom progress is 0.
        context.on_scroll(0.0, 900.0, 0.1, &mut camera);
        assert!(!context.particles().any_exploded());
        assert!(context.particles().groups().iter().all(|g| g.is_visible()));
    }

    #[test]
    fn entering_pitch_requests_section_swap() {
        let mut context = context();
        let mut camera = Camera::default();
        let mut nodes = Nodes::default();
        nodes.visible.insert(1, true);
        nodes.visible.insert(2, true);
        context
            .lifecycle_mut()
            .register_group(CELL_GROUP, GroupMode::Hide, vec![1], vec![10]);
        context
            .lifecycle_mut()
            .register_group(PRODUCT_GROUP, GroupMode::Hide, vec![2], vec![20]);
        context.dispose_group(PRODUCT_GROUP, &mut nodes).unwrap();

        let outcome = context.on_scroll(3500.0, 900.0, 1.0, &mut camera).unwrap();
        assert_eq!(outcome.snapshot.active, Some(RegionName::Pitch));
        assert_eq!(outcome.product_revealed, Some(true));

        // Nothing applied until the debounce window has passed.
        assert!(context.lifecycle.flush(1.05, &mut nodes).is_empty());
        let applied = context.lifecycle.flush(1.2, &mut nodes);
        assert_eq!(applied.len(), 2);
        assert_eq!(nodes.visible[&1], false);
        assert_eq!(nodes.visible[&2], true);
    }

    #[test]
    fn colour_change_validates_palette() {
        let mut context = context();
        let mut rig = Rig::default();
        assert_eq!(
            context.trigger_color_change("ultraviolet", &mut rig),
            Err(SceneError::UnknownColor("ultraviolet".into()))
        );
        assert_eq!(context.can_change_color("pearl"), Ok(false));
        assert_eq!(context.trigger_color_change("coral", &mut rig), Ok(true));
        assert_eq!(context.trigger_color_change("sage", &mut rig), Ok(false));
        assert!(rig.locked);
    }

    #[test]
    fn frames_complete_the_colour_change() {
        let mut context = context();
        let mut rig = Rig::default();
        let mut nodes = Nodes::default();
        let mut driver = Driver::default();
        context.start(&mut driver);
        context.trigger_color_change("lagoon", &mut rig).unwrap();

        let mut completed = None;
        let mut now = 0.0;
        for _ in 0..400 {
            now += 1.0 / 60.0;
            let report = context.run_frame(now, 1.0 / 60.0, &mut rig, &mut nodes, &mut driver);
            assert!(report.ran);
            if report.color_completed.is_some() {
                completed = report.color_completed;
                break;
            }
        }

        assert_eq!(completed.as_deref(), Some("lagoon"));
        assert_eq!(context.color().settled_color(), "lagoon");
        assert!(!rig.locked);
        assert_eq!(rig.color, [0.02, 0.36, 0.42]);
    }

    #[test]
    fn suspended_loop_skips_scene_work() {
        let mut context = context();
        let mut rig = Rig::default();
        let mut nodes = Nodes::default();
        let mut driver = Driver::default();
        context.start(&mut driver);

        let report = context.run_frame(11.0, 0.016, &mut rig, &mut nodes, &mut driver);
        assert_eq!(report.activity, Some(ActivityTransition::Suspended));
        assert!(!report.ran);
        assert!(!context.run_frame(11.5, 0.016, &mut rig, &mut nodes, &mut driver).ran);

        assert_eq!(
            context.on_pointer_activity(12.0, &mut driver),
            Some(ActivityTransition::Resumed)
        );
        assert!(context.run_frame(12.1, 0.016, &mut rig, &mut nodes, &mut driver).ran);
    }

    #[test]
    fn state_summary_reflects_scroll() {
        let mut context = context();
        let mut camera = Camera::default();
        context.on_scroll(450.0, 900.0, 0.0, &mut camera);
        let state = context.state_summary();
        assert_eq!(state.active_region, Some(RegionName::Zoom));
        assert_eq!(state.progress[&RegionName::Zoom], 0.25);
        assert_eq!(state.settled_color, "pearl");
        assert!(!state.suspended);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["active_region"], "zoom");
        assert_eq!(json["progress"]["zoom-out"], 0.0);
    }
}
