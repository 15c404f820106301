use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::core::error::SceneError;

/// Named scroll sections, declared in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionName {
    Splash,
    Zoom,
    ZoomOut,
    Pitch,
}

impl RegionName {
    pub const COUNT: usize = 4;

    /// Fixed order in which regions compete for the active slot.
    pub const PRIORITY: [RegionName; Self::COUNT] = [
        RegionName::Splash,
        RegionName::Zoom,
        RegionName::ZoomOut,
        RegionName::Pitch,
    ];

    /// Convert a DOM section identifier to a region.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "splash" => Some(Self::Splash),
            "zoom" => Some(Self::Zoom),
            "zoom-out" | "zoom_out" | "zoomout" => Some(Self::ZoomOut),
            "pitch" | "product" => Some(Self::Pitch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Splash => "splash",
            Self::Zoom => "zoom",
            Self::ZoomOut => "zoom-out",
            Self::Pitch => "pitch",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-relative extent of a measured section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub name: RegionName,
    pub dom_top_offset: f32,
    pub dom_bottom_offset: f32,
}

impl ScrollRegion {
    pub fn new(name: RegionName, dom_top_offset: f32, dom_bottom_offset: f32) -> Self {
        Self {
            name,
            dom_top_offset,
            dom_bottom_offset,
        }
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !self.dom_top_offset.is_finite() || !self.dom_bottom_offset.is_finite() {
            return Err(SceneError::InvalidRegion {
                name: self.name,
                reason: "offsets must be finite",
            });
        }
        if self.dom_bottom_offset < self.dom_top_offset {
            return Err(SceneError::InvalidRegion {
                name: self.name,
                reason: "bottom offset lies above top offset",
            });
        }
        Ok(())
    }

    /// Scroll offsets over which this region animates. Shifted up by one
    /// viewport so the transition starts as the section's top edge enters
    /// from the bottom of the screen.
    pub fn active_window(&self, viewport_height: f32) -> (f32, f32) {
        (
            self.dom_top_offset - viewport_height,
            self.dom_bottom_offset - viewport_height,
        )
    }

    pub fn contains(&self, offset: f32, viewport_height: f32) -> bool {
        let (start, end) = self.active_window(viewport_height);
        offset >= start && offset <= end
    }

    pub fn progress_at(&self, offset: f32, viewport_height: f32) -> f32 {
        let (start, end) = self.active_window(viewport_height);
        if offset < start {
            return 0.0;
        }
        if offset > end || end <= start {
            return 1.0;
        }
        ((offset - start) / (end - start)).clamp(0.0, 1.0)
    }
}

/// Per-tick result of mapping one scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSnapshot {
    progress: [Option<f32>; RegionName::COUNT],
    pub active: Option<RegionName>,
    /// Offset lies past the last measured region; downstream work can stop.
    pub parked: bool,
}

impl ProgressSnapshot {
    /// Progress of a region, or `None` if it was never measured.
    pub fn progress(&self, name: RegionName) -> Option<f32> {
        self.progress[name.index()]
    }

    pub fn active_progress(&self) -> Option<(RegionName, f32)> {
        let name = self.active?;
        self.progress(name).map(|p| (name, p))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionName, f32)> + '_ {
        RegionName::PRIORITY
            .iter()
            .filter_map(|name| self.progress(*name).map(|p| (*name, p)))
    }
}

/// Map a scroll offset onto every measured region.
pub fn map_progress(
    offset: f32,
    regions: &[ScrollRegion],
    viewport_height: f32,
) -> ProgressSnapshot {
    let mut snapshot = ProgressSnapshot::default();

    for region in regions {
        snapshot.progress[region.name.index()] = Some(region.progress_at(offset, viewport_height));
    }

    snapshot.active = RegionName::PRIORITY.iter().copied().find(|name| {
        regions
            .iter()
            .any(|region| region.name == *name && region.contains(offset, viewport_height))
    });

    if snapshot.active.is_none() {
        let last = regions.iter().max_by_key(|region| region.name);
        if let Some(last) = last {
            let (_, end) = last.active_window(viewport_height);
            if offset > end {
                snapshot.progress[last.name.index()] = Some(1.0);
                snapshot.parked = true;
            }
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<ScrollRegion> {
        vec![
            ScrollRegion::new(RegionName::Splash, 0.0, 800.0),
            ScrollRegion::new(RegionName::Zoom, 1000.0, 2000.0),
            ScrollRegion::new(RegionName::ZoomOut, 2000.0, 3000.0),
            ScrollRegion::new(RegionName::Pitch, 3000.0, 4000.0),
        ]
    }

    #[test]
    fn window_is_shifted_by_viewport_height() {
        let region = ScrollRegion::new(RegionName::Zoom, 1000.0, 2000.0);
        assert_eq!(region.active_window(800.0), (200.0, 1200.0));
        assert_eq!(region.progress_at(700.0, 800.0), 0.5);
        assert_eq!(region.progress_at(1400.0, 800.0), 1.0);
        assert_eq!(region.progress_at(100.0, 800.0), 0.0);
    }

    #[test]
    fn outside_window_is_exactly_zero_or_one() {
        let region = ScrollRegion::new(RegionName::Zoom, 1000.0, 2000.0);
        for offset in [-500.0, 0.0, 150.0, 199.99] {
            assert_eq!(region.progress_at(offset, 800.0), 0.0);
        }
        for offset in [1200.01, 1500.0, 9000.0] {
            assert_eq!(region.progress_at(offset, 800.0), 1.0);
        }
    }

    #[test]
    fn progress_is_monotonic_inside_window() {
        let region = ScrollRegion::new(RegionName::ZoomOut, 2000.0, 3000.0);
        let mut previous = 0.0;
        let mut offset = 1200.0;
        while offset <= 2200.0 {
            let progress = region.progress_at(offset, 800.0);
            assert!(progress >= previous, "{} < {} at {}", progress, previous, offset);
            previous = progress;
            offset += 7.5;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn degenerate_region_steps_at_its_start() {
        let region = ScrollRegion::new(RegionName::Pitch, 500.0, 500.0);
        assert_eq!(region.progress_at(-1.0, 500.0), 0.0);
        assert_eq!(region.progress_at(0.0, 500.0), 1.0);
    }

    #[test]
    fn first_region_in_priority_order_wins_on_shared_boundary() {
        // Zoom ends at 1200 and zoom-out starts at 1200.
        let snapshot = map_progress(1200.0, &layout(), 800.0);
        assert_eq!(snapshot.active, Some(RegionName::Zoom));
        assert_eq!(snapshot.progress(RegionName::Zoom), Some(1.0));
        assert_eq!(snapshot.progress(RegionName::ZoomOut), Some(0.0));
    }

    #[test]
    fn snapshot_reports_active_region_progress() {
        let snapshot = map_progress(700.0, &layout(), 800.0);
        assert_eq!(snapshot.active_progress(), Some((RegionName::Zoom, 0.5)));
        assert_eq!(snapshot.progress(RegionName::Pitch), Some(0.0));
        assert!(!snapshot.parked);
    }

    #[test]
    fn offset_past_last_region_parks() {
        let snapshot = map_progress(5000.0, &layout(), 800.0);
        assert_eq!(snapshot.active, None);
        assert!(snapshot.parked);
        assert_eq!(snapshot.progress(RegionName::Pitch), Some(1.0));
    }

    #[test]
    fn single_region_scenario() {
        let regions = [ScrollRegion::new(RegionName::Zoom, 1000.0, 2000.0)];
        let parked = map_progress(1400.0, &regions, 800.0);
        assert!(parked.parked);
        assert_eq!(parked.progress(RegionName::Zoom), Some(1.0));

        let inside = map_progress(700.0, &regions, 800.0);
        assert_eq!(inside.active_progress(), Some((RegionName::Zoom, 0.5)));
    }

    #[test]
    fn gap_between_regions_has_no_active_region_and_is_not_parked() {
        let regions = [
            ScrollRegion::new(RegionName::Splash, 0.0, 500.0),
            ScrollRegion::new(RegionName::Zoom, 2000.0, 3000.0),
        ];
        let snapshot = map_progress(0.0, &regions, 800.0);
        assert_eq!(snapshot.active, None);
        assert!(!snapshot.parked);
    }

    #[test]
    fn region_names_parse_dom_aliases() {
        assert_eq!(RegionName::from_string("Zoom_Out"), Some(RegionName::ZoomOut));
        assert_eq!(RegionName::from_string("product"), Some(RegionName::Pitch));
        assert_eq!(RegionName::from_string("footer"), None);
    }

    #[test]
    fn invalid_measurements_are_rejected() {
        let flipped = ScrollRegion::new(RegionName::Zoom, 2000.0, 1000.0);
        assert!(matches!(
            flipped.validate(),
            Err(SceneError::InvalidRegion { name: RegionName::Zoom, .. })
        ));
        let nan = ScrollRegion::new(RegionName::Zoom, f32::NAN, 1000.0);
        assert!(nan.validate().is_err());
    }
}
