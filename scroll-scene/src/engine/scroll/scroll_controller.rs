use bevy::log::debug;

use super::progress_mapper::{ProgressSnapshot, RegionName, ScrollRegion, map_progress};
use crate::engine::core::error::SceneError;

/// Change of active region between two scroll ticks. `None` on either side
/// means no region was active (before the first window, in a gap, or parked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionTransition {
    pub from: Option<RegionName>,
    pub to: Option<RegionName>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUpdate {
    pub snapshot: ProgressSnapshot,
    pub transition: Option<RegionTransition>,
}

/// Holds the latest section measurements and suppresses updates once the
/// offset has been parked past the interactive range.
#[derive(Debug, Default)]
pub struct ScrollController {
    regions: Vec<ScrollRegion>,
    last_snapshot: Option<ProgressSnapshot>,
    last_viewport_height: f32,
}

impl ScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a measurement batch and put it in priority order. A region
    /// may be measured at most once.
    pub fn prepare_regions(
        mut regions: Vec<ScrollRegion>,
    ) -> Result<Vec<ScrollRegion>, SceneError> {
        for region in &regions {
            region.validate()?;
        }
        regions.sort_by_key(|region| region.name);
        if let Some(pair) = regions.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(SceneError::DuplicateRegion(pair[0].name));
        }
        Ok(regions)
    }

    /// Replace all measurements.
    pub fn set_regions(&mut self, regions: Vec<ScrollRegion>) -> Result<(), SceneError> {
        self.regions = Self::prepare_regions(regions)?;
        // Fresh measurements invalidate the parked latch.
        self.last_snapshot = None;
        Ok(())
    }

    pub fn regions(&self) -> &[ScrollRegion] {
        &self.regions
    }

    pub fn last_snapshot(&self) -> Option<&ProgressSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Map a scroll offset. Returns `None` when nothing is measured or when
    /// the previous tick was already parked and this one still is.
    pub fn on_scroll(&mut self, offset: f32, viewport_height: f32) -> Option<ScrollUpdate> {
        if self.regions.is_empty() {
            return None;
        }

        let snapshot = map_progress(offset, &self.regions, viewport_height);
        let previous = self.last_snapshot.replace(snapshot);
        let viewport_changed = self.last_viewport_height != viewport_height;
        self.last_viewport_height = viewport_height;

        if let Some(previous) = previous {
            if previous.parked && snapshot.parked && !viewport_changed {
                return None;
            }
        }

        let previous_active = previous.and_then(|p| p.active);
        let transition = if previous.is_none() || previous_active != snapshot.active {
            debug!(
                "Scroll region {:?} -> {:?} at offset {}",
                previous_active, snapshot.active, offset
            );
            Some(RegionTransition {
                from: previous_active,
                to: snapshot.active,
            })
        } else {
            None
        };

        Some(ScrollUpdate {
            snapshot,
            transition,
        })
    }
}
