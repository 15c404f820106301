/// Duration of each wind-up / wind-down transform step (seconds)
pub const TRANSFORM_STEP_DURATION: f32 = 0.45;

/// Duration of the recolour step (seconds)
pub const RECOLOR_DURATION: f32 = 1.2;

/// Tilt applied to the product before it lifts (radians about X)
pub const ROTATE_DOWN_ANGLE: f32 = -0.35;

/// Lift applied to the product while it recolours (world units)
pub const LIFT_HEIGHT: f32 = 0.6;
