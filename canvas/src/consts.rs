//! Shared numeric constants for the canvas crate.

// ── Camera ──────────────────────────────────────────────────────

/// Minimum zoom factor; below this the transform degenerates.
pub const ZOOM_MIN: f64 = 0.1;

/// Maximum zoom factor.
pub const ZOOM_MAX: f64 = 10.0;

/// Base of the exponential wheel-zoom curve.
pub const WHEEL_ZOOM_BASE: f64 = 1.1;

/// Wheel delta that corresponds to one full zoom step.
pub const WHEEL_ZOOM_NORMALIZER: f64 = 100.0;

// ── Publishing ──────────────────────────────────────────────────

/// Minimum interval between cursor/progress publishes, in milliseconds.
/// One publish per animation frame at 60 Hz.
pub const PUBLISH_THROTTLE_MS: f64 = 16.0;

/// Upper bound of the randomized bootstrap reply delay, in milliseconds.
/// Spreads `sync-state` replies so a join does not trigger a reply storm.
pub const SYNC_REPLY_MAX_DELAY_MS: u64 = 500;

// ── Paths ───────────────────────────────────────────────────────

/// Base icon stamp size in world units.
pub const ICON_BASE_SIZE: f64 = 40.0;
