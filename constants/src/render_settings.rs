use bevy::color::Color;

pub const CLEAR_COLOR: Color = Color::srgb(0.01, 0.01, 0.025);

pub const CELL_COLOR: Color = Color::srgb(0.55, 0.18, 0.42);

pub const CELL_RADIUS: f32 = 1.6;

pub const PARTICLE_COLOR: Color = Color::srgb(0.85, 0.9, 1.0);

/// Product capsule (radius, half length)
pub const PRODUCT_DIMENSIONS: (f32, f32) = (0.45, 0.7);

pub const CAMERA_POSITION: [f32; 3] = [0.0, 0.4, 7.5];

pub const AMBIENT_BRIGHTNESS: f32 = 180.0;
