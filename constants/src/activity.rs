/// Interval between inactivity checks (seconds)
pub const ACTIVITY_POLL_INTERVAL_SECS: f64 = 1.0;

/// Idle time after which the render loop is suspended (seconds)
pub const IDLE_THRESHOLD_SECS: f64 = 10.0;

/// Upper bound on a single frame's delta, so a resumed loop does not jump
/// tweens forward by the whole idle period (seconds)
pub const MAX_FRAME_DELTA_SECS: f64 = 0.1;
