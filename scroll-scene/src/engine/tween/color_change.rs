use bevy::log::{debug, info};
use serde::{Deserialize, Serialize};

use super::easing::Easing;
use super::sequence::{SequenceEvent, TweenSequence, TweenStep, TweenTarget};

/// The product node the colour-change sequence animates.
///
/// Getters return `None` when the node or its material is not in the scene;
/// the matching step then completes immediately without touching anything.
pub trait ProductRig {
    /// Tilt about the X axis in radians.
    fn rotation(&self) -> Option<f32>;
    fn set_rotation(&mut self, radians: f32);
    fn height(&self) -> Option<f32>;
    fn set_height(&mut self, height: f32);
    /// Linear RGB base colour.
    fn color(&self) -> Option<[f32; 3]>;
    /// Write a linear RGB colour and flag the material for re-upload.
    fn set_color(&mut self, rgb: [f32; 3]);
    fn set_controls_enabled(&mut self, enabled: bool);
    fn set_scroll_locked(&mut self, locked: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductProperty {
    Rotation,
    Height,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChangePhase {
    #[default]
    Idle,
    RotateDown,
    MoveUp,
    Recolor,
    MoveDown,
    RotateUp,
}

impl ColorChangePhase {
    /// Phase for each step index of the built sequence.
    const STEPS: [ColorChangePhase; 5] = [
        ColorChangePhase::RotateDown,
        ColorChangePhase::MoveUp,
        ColorChangePhase::Recolor,
        ColorChangePhase::MoveDown,
        ColorChangePhase::RotateUp,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTimings {
    pub transform_duration: f32,
    pub recolor_duration: f32,
    pub rotate_down_angle: f32,
    pub lift_height: f32,
    pub easing: Easing,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        use constants::sequence::*;
        Self {
            transform_duration: TRANSFORM_STEP_DURATION,
            recolor_duration: RECOLOR_DURATION,
            rotate_down_angle: ROTATE_DOWN_ANGLE,
            lift_height: LIFT_HEIGHT,
            easing: Easing::QuadraticInOut,
        }
    }
}

/// Adapts a `ProductRig` to the generic tween target interface.
struct RigTarget<'a, R: ProductRig>(&'a mut R);

impl<R: ProductRig> TweenTarget<ProductProperty> for RigTarget<'_, R> {
    fn read(&self, property: ProductProperty) -> Option<Vec<f32>> {
        match property {
            ProductProperty::Rotation => self.0.rotation().map(|r| vec![r]),
            ProductProperty::Height => self.0.height().map(|h| vec![h]),
            ProductProperty::Color => self.0.color().map(|c| c.to_vec()),
        }
    }

    fn write(&mut self, property: ProductProperty, values: &[f32]) {
        match (property, values) {
            (ProductProperty::Rotation, [r]) => self.0.set_rotation(*r),
            (ProductProperty::Height, [h]) => self.0.set_height(*h),
            (ProductProperty::Color, [r, g, b]) => self.0.set_color([*r, *g, *b]),
            _ => {}
        }
    }
}

/// Rotate-down, lift, recolour, lower, rotate-up. One run at a time.
#[derive(Debug)]
pub struct ColorChangeSequencer {
    sequence: TweenSequence<ProductProperty>,
    phase: ColorChangePhase,
    settled_color: String,
    pending_color: Option<String>,
    timings: SequenceTimings,
}

impl ColorChangeSequencer {
    pub fn new(settled_color: impl Into<String>, timings: SequenceTimings) -> Self {
        Self {
            sequence: TweenSequence::new(),
            phase: ColorChangePhase::Idle,
            settled_color: settled_color.into(),
            pending_color: None,
            timings,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.sequence.is_animating()
    }

    pub fn phase(&self) -> ColorChangePhase {
        self.phase
    }

    pub fn settled_color(&self) -> &str {
        &self.settled_color
    }

    pub fn pending_color(&self) -> Option<&str> {
        self.pending_color.as_deref()
    }

    /// Queue and start the five-step sequence towards `color_id`.
    ///
    /// Returns `false` without scheduling anything while a sequence is
    /// running or when `color_id` is already the settled colour.
    pub fn start<R: ProductRig>(&mut self, color_id: &str, rgb: [f32; 3], rig: &mut R) -> bool {
        if self.sequence.is_animating() {
            debug!("Colour change to '{}' ignored: sequence running", color_id);
            return false;
        }
        if self.settled_color == color_id {
            debug!("Colour change to '{}' ignored: already settled", color_id);
            return false;
        }

        let base_rotation = rig.rotation().unwrap_or_default();
        let base_height = rig.height().unwrap_or_default();
        let t = self.timings;

        let steps = [
            (
                ProductProperty::Rotation,
                vec![base_rotation + t.rotate_down_angle],
                t.transform_duration,
            ),
            (ProductProperty::Height, vec![base_height + t.lift_height], t.transform_duration),
            (ProductProperty::Color, rgb.to_vec(), t.recolor_duration),
            (ProductProperty::Height, vec![base_height], t.transform_duration),
            (ProductProperty::Rotation, vec![base_rotation], t.transform_duration),
        ];
        for (property, to, duration) in steps {
            self.sequence.push(TweenStep::new(property, to, duration, t.easing));
        }

        if !self.sequence.start() {
            self.sequence.clear();
            return false;
        }

        rig.set_controls_enabled(false);
        rig.set_scroll_locked(true);
        self.phase = ColorChangePhase::RotateDown;
        self.pending_color = Some(color_id.to_string());
        info!("Colour change started: {} -> {}", self.settled_color, color_id);
        true
    }

    /// Advance the running sequence. Returns the new settled colour id on the
    /// frame the final step completes.
    pub fn advance<R: ProductRig>(&mut self, dt: f32, rig: &mut R) -> Option<String> {
        if !self.sequence.is_animating() {
            return None;
        }

        let events = self.sequence.advance(dt, &mut RigTarget(rig));
        let mut completed = None;

        for event in events {
            match event {
                SequenceEvent::StepStarted(index) => {
                    if let Some(phase) = ColorChangePhase::STEPS.get(index) {
                        self.phase = *phase;
                    }
                }
                SequenceEvent::StepCompleted(_) => {}
                SequenceEvent::Finished => {
                    self.phase = ColorChangePhase::Idle;
                    if let Some(color) = self.pending_color.take() {
                        self.settled_color = color.clone();
                        completed = Some(color);
                    }
                    rig.set_controls_enabled(true);
                    rig.set_scroll_locked(false);
                    info!("Colour change settled on {}", self.settled_color);
                }
            }
        }

        completed
    }

    /// Abort without restoring transforms. Controls and scroll are released.
    pub fn cancel<R: ProductRig>(&mut self, rig: &mut R) {
        if !self.sequence.is_animating() {
            return;
        }
        self.sequence.clear();
        self.pending_color = None;
        self.phase = ColorChangePhase::Idle;
        rig.set_controls_enabled(true);
        rig.set_scroll_locked(false);
    }
}
