//! Tracking and release of GPU resources, DOM listeners and scene groups.
//!
//! Everything registered during scene setup is released exactly once,
//! either per logical group (`dispose`) or all at once (`cleanup_all`).

/// Trailing debounce used by scroll-driven disposal requests.
pub mod debounce;

/// Resource, listener and group bookkeeping with idempotent disposal.
pub mod registry;
