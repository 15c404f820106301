//! JSON-RPC 2.0 communication layer for the host page.
//!
//! The canvas is embedded in a scrolling marketing page. The page owns the
//! DOM: it measures the scroll sections, reports the scroll offset and user
//! input, and renders the swatch controls. Messages travel over
//! `postMessage` in both directions.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ measure_regions / on_scroll ────────> │
//!        │                                        ├─ SceneCommand events
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Requests without an `id` are processed like any other but never answered,
//! so the page can stream `on_scroll` calls as notifications.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (unknown region, colour or group included)
//! - `-32603`: Internal error
//! - `-32000`: Scene not ready
//!
//! ## Methods
//!
//! ### Scroll
//! - `on_scroll`: `{ offset, viewport_height }` latest page offset
//! - `measure_regions`: `{ regions: [{ name, top, bottom }] }` section rectangles
//!
//! ### Activity
//! - `on_pointer_activity`, `on_scroll_activity`: wake a suspended render loop
//!
//! ### Product
//! - `trigger_color_change`: `{ color }` queue the colour-change sequence;
//!   the reply says whether it was queued, `color_change_started` confirms it
//! - `get_palette`: list selectable colours
//!
//! ### Lifecycle
//! - `dispose_group`, `reinstate_group`: `{ group }`
//! - `request_group`: `{ group, intent: "dispose" | "reinstate" }` debounced,
//!   applied by the frame loop once the group has been quiet for the window
//! - `cleanup_all`: release everything and stop the scene
//!
//! ### Diagnostics
//! - `get_scene_state`: region progress, sequence phase, activity and groups
//!
//! ## Notifications
//!
//! `region_changed`, `particles_exploded`, `activity_state_changed`,
//! `color_change_started`, `color_change_completed`, `scroll_lock_changed`,
//! `group_disposed`, `group_reinstated`, `scene_cleaned_up`.

/// JSON-RPC 2.0 bidirectional communication system for the host page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
