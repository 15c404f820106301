use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::activity::activity_monitor::ActivitySettings;
use crate::engine::camera::fov_controller::{FovController, FovRange};
use crate::engine::core::error::SceneError;
use crate::engine::particles::particle_system::ParticleSettings;
use crate::engine::scroll::progress_mapper::RegionName;
use crate::engine::tween::color_change::SequenceTimings;

/// Field-of-view curve per scroll region (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FovSettings {
    pub initial: f32,
    pub epsilon: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splash: Option<FovRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<FovRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_out: Option<FovRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<FovRange>,
}

impl Default for FovSettings {
    fn default() -> Self {
        use constants::scroll::*;
        Self {
            initial: DEFAULT_FOV_DEGREES,
            epsilon: FOV_PROGRESS_EPSILON,
            splash: None,
            zoom: Some(ZOOM_FOV_RANGE.into()),
            zoom_out: Some(ZOOM_OUT_FOV_RANGE.into()),
            pitch: None,
        }
    }
}

impl FovSettings {
    pub fn controller(&self) -> FovController {
        let ranges = [
            (RegionName::Splash, self.splash),
            (RegionName::Zoom, self.zoom),
            (RegionName::ZoomOut, self.zoom_out),
            (RegionName::Pitch, self.pitch),
        ];
        ranges
            .into_iter()
            .fold(FovController::new(self.epsilon), |controller, (region, range)| {
                match range {
                    Some(range) => controller.with_range(region, range),
                    None => controller,
                }
            })
    }
}

/// Selectable product finish. `rgb` is linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub id: String,
    pub name: String,
    pub rgb: [f32; 3],
}

/// Scene tuning loaded from `assets/scene_config.json`.
///
/// Every field falls back to the tuned constants, so a partial or empty JSON
/// object is a valid configuration.
#[derive(Asset, Debug, Clone, Serialize, Deserialize, TypePath, Resource)]
#[serde(default)]
pub struct SceneConfig {
    pub fov: FovSettings,
    pub particles: ParticleSettings,
    pub sequence: SequenceTimings,
    pub activity: ActivitySettings,
    /// Trailing debounce window for group disposal (seconds).
    pub dispose_debounce: f64,
    pub palette: Vec<PaletteEntry>,
    pub default_color: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        use constants::palette::{DEFAULT_COLOR_ID, PRODUCT_PALETTE};
        Self {
            fov: FovSettings::default(),
            particles: ParticleSettings::default(),
            sequence: SequenceTimings::default(),
            activity: ActivitySettings::default(),
            dispose_debounce: constants::scroll::DISPOSE_DEBOUNCE_SECS,
            palette: PRODUCT_PALETTE
                .iter()
                .map(|info| PaletteEntry {
                    id: info.id.to_string(),
                    name: info.name.to_string(),
                    rgb: info.rgb,
                })
                .collect(),
            default_color: DEFAULT_COLOR_ID.to_string(),
        }
    }
}

impl SceneConfig {
    pub fn color(&self, id: &str) -> Result<&PaletteEntry, SceneError> {
        self.palette
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| SceneError::UnknownColor(id.to_string()))
    }

    /// Settled colour at startup. Falls back to the first palette entry if
    /// the configured id is missing.
    pub fn initial_color(&self) -> Option<&PaletteEntry> {
        self.color(&self.default_color)
            .ok()
            .or_else(|| self.palette.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_tuned_defaults() {
        let config: SceneConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.fov.zoom, Some(FovRange::new(50.0, 12.0)));
        assert_eq!(config.particles.count, constants::particles::PARTICLE_COUNT);
        assert_eq!(config.palette.len(), constants::palette::PRODUCT_PALETTE.len());
        assert_eq!(config.initial_color().map(|c| c.id.as_str()), Some("pearl"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: SceneConfig = serde_json::from_str(
            r#"{
                "fov": { "zoom": { "start": 70.0, "end": 30.0 } },
                "particles": { "count": 40 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.fov.zoom, Some(FovRange::new(70.0, 30.0)));
        assert_eq!(config.fov.epsilon, constants::scroll::FOV_PROGRESS_EPSILON);
        assert_eq!(config.particles.count, 40);
        assert_eq!(config.particles.group_multipliers.len(), 5);
    }

    #[test]
    fn unknown_colour_is_an_error() {
        let config = SceneConfig::default();
        assert_eq!(
            config.color("chartreuse").unwrap_err(),
            SceneError::UnknownColor("chartreuse".into())
        );
    }

    #[test]
    fn missing_default_colour_falls_back_to_first_entry() {
        let config = SceneConfig {
            default_color: "nope".into(),
            ..default()
        };
        assert_eq!(config.initial_color().map(|c| c.id.as_str()), Some("pearl"));
    }

    #[test]
    fn controller_only_carries_configured_ranges() {
        let controller = FovSettings::default().controller();
        assert!(controller.range(RegionName::Zoom).is_some());
        assert!(controller.range(RegionName::ZoomOut).is_some());
        assert!(controller.range(RegionName::Splash).is_none());
        assert!(controller.range(RegionName::Pitch).is_none());
    }
}
