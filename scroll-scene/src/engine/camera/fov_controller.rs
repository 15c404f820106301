use serde::{Deserialize, Serialize};

use crate::engine::scroll::progress_mapper::RegionName;
use crate::engine::tween::easing::{Easing, lerp};

/// Camera with a mutable field of view (degrees). `update_projection` is the
/// expensive step and must only run after `set_fov`.
pub trait FovCamera {
    fn set_fov(&mut self, degrees: f32);
    fn update_projection(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovRange {
    pub start: f32,
    pub end: f32,
}

impl FovRange {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn at(&self, progress: f32) -> f32 {
        lerp(self.start, self.end, Easing::QuadraticInOut.apply(progress))
    }
}

impl From<(f32, f32)> for FovRange {
    fn from((start, end): (f32, f32)) -> Self {
        Self::new(start, end)
    }
}

#[derive(Debug, Clone)]
pub struct FovController {
    ranges: [Option<FovRange>; RegionName::COUNT],
    epsilon: f32,
    last_applied: Option<(RegionName, f32)>,
    projection_updates: u64,
}

impl FovController {
    pub fn new(epsilon: f32) -> Self {
        Self {
            ranges: [None; RegionName::COUNT],
            epsilon,
            last_applied: None,
            projection_updates: 0,
        }
    }

    pub fn with_range(mut self, region: RegionName, range: FovRange) -> Self {
        self.ranges[region as usize] = Some(range);
        self
    }

    pub fn range(&self, region: RegionName) -> Option<FovRange> {
        self.ranges[region as usize]
    }

    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }

    pub fn last_applied(&self) -> Option<(RegionName, f32)> {
        self.last_applied
    }

    /// Write the eased field of view for `region` at `progress`.
    ///
    /// Returns `true` when the camera projection was recomputed.
    pub fn apply<C: FovCamera>(
        &mut self,
        region: RegionName,
        progress: f32,
        camera: &mut C,
    ) -> bool {
        let Some(range) = self.range(region) else {
            return false;
        };
        let progress = progress.clamp(0.0, 1.0);

        if let Some((last_region, last_progress)) = self.last_applied {
            if last_region == region {
                let delta = (progress - last_progress).abs();
                // Endpoints always land so the camera settles on the exact constant.
                let reaching_endpoint = delta > 0.0 && (progress == 0.0 || progress == 1.0);
                if delta < self.epsilon && !reaching_endpoint {
                    return false;
                }
            }
        }

        camera.set_fov(range.at(progress));
        camera.update_projection();
        self.last_applied = Some((region, progress));
        self.projection_updates += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockCamera {
        fov: f32,
        updates: usize,
    }

    impl FovCamera for MockCamera {
        fn set_fov(&mut self, degrees: f32) {
            self.fov = degrees;
        }
        fn update_projection(&mut self) {
            self.updates += 1;
        }
    }

    fn controller() -> FovController {
        FovController::new(0.0005).with_range(RegionName::Zoom, FovRange::new(60.0, 20.0))
    }

    #[test]
    fn tiny_progress_change_skips_projection() {
        let mut camera = MockCamera::default();
        let mut controller = controller();
        assert!(controller.apply(RegionName::Zoom, 0.500, &mut camera));
        assert!(!controller.apply(RegionName::Zoom, 0.5003, &mut camera));
        assert_eq!(camera.updates, 1);
        assert_eq!(camera.fov, 40.0);
    }

    #[test]
    fn eases_rather_than_interpolating_linearly() {
        let mut camera = MockCamera::default();
        let mut controller = controller();
        controller.apply(RegionName::Zoom, 0.25, &mut camera);
        // Quadratic ease-in covers an eighth of the range at a quarter of the way.
        assert_eq!(camera.fov, 55.0);
    }

    #[test]
    fn small_steps_accumulate_until_threshold() {
        let mut camera = MockCamera::default();
        let mut controller = controller();
        controller.apply(RegionName::Zoom, 0.3, &mut camera);
        assert!(!controller.apply(RegionName::Zoom, 0.3002, &mut camera));
        assert!(!controller.apply(RegionName::Zoom, 0.3004, &mut camera));
        assert!(controller.apply(RegionName::Zoom, 0.3006, &mut camera));
        assert_eq!(camera.updates, 2);
    }

    #[test]
    fn endpoint_always_lands() {
        let mut camera = MockCamera::default();
        let mut controller = controller();
        controller.apply(RegionName::Zoom, 0.9998, &mut camera);
        assert!(controller.apply(RegionName::Zoom, 1.0, &mut camera));
        assert_eq!(camera.fov, 20.0);
        assert!(!controller.apply(RegionName::Zoom, 1.0, &mut camera));
    }

    #[test]
    fn region_without_range_leaves_camera_alone() {
        let mut camera = MockCamera::default();
        let mut controller = controller();
        assert!(!controller.apply(RegionName::Pitch, 0.5, &mut camera));
        assert_eq!(camera.updates, 0);
    }

    #[test]
    fn switching_region_resets_guard() {
        let mut camera = MockCamera::default();
        let mut controller =
            controller().with_range(RegionName::ZoomOut, FovRange::new(20.0, 60.0));
        controller.apply(RegionName::Zoom, 1.0, &mut camera);
        assert!(controller.apply(RegionName::ZoomOut, 0.0, &mut camera));
        assert_eq!(camera.fov, 20.0);
        assert_eq!(controller.projection_updates(), 2);
    }
}
