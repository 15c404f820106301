/// Field of view the camera starts with before any scroll input (degrees)
pub const DEFAULT_FOV_DEGREES: f32 = 50.0;

/// Zoom region: camera pushes into the cell (start, end) in degrees
pub const ZOOM_FOV_RANGE: (f32, f32) = (50.0, 12.0);

/// Zoom-out region: camera pulls back out to reveal the product (start, end) in degrees
pub const ZOOM_OUT_FOV_RANGE: (f32, f32) = (12.0, 58.0);

/// Minimum change in normalised progress before the projection is recomputed
pub const FOV_PROGRESS_EPSILON: f32 = 0.0005;

/// Trailing debounce window for scroll-driven group disposal (seconds)
pub const DISPOSE_DEBOUNCE_SECS: f64 = 0.15;

/// Logical group holding the product model
pub const PRODUCT_GROUP: &str = "product";

/// Logical group holding the cell geometry and the starfield backdrop
pub const CELL_GROUP: &str = "cell";

/// Section layout used by native builds where no host page reports measurements.
/// (name, top, bottom) in document pixels.
pub const NATIVE_REGION_LAYOUT: &[(&str, f32, f32)] = &[
    ("splash", 0.0, 900.0),
    ("zoom", 900.0, 2700.0),
    ("zoom-out", 2700.0, 4200.0),
    ("pitch", 4200.0, 5400.0),
];

/// Viewport height assumed by native builds (pixels)
pub const NATIVE_VIEWPORT_HEIGHT: f32 = 900.0;

/// Wheel pixels per line for native scroll emulation
pub const NATIVE_PIXELS_PER_LINE: f32 = 48.0;
