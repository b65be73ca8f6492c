//! Default operating constants for the matching engine.
//!
//! Tolerances and speeds are the fleet-wide figures agreed with branch
//! operations; runs can override the schedule-shift tolerances via
//! [`crate::services::matching::Tolerances`].

/// Maximum acceptable idle between unload completion and the load window (hours).
pub const MAX_IDLE_HOURS: f64 = 4.0;

/// How far an unload may be pushed back (hours).
pub const MAX_DELAY_UNLOAD_HOURS: f64 = 8.0;

/// How far a load may be pushed back (hours).
pub const MAX_DELAY_LOAD_HOURS: f64 = 8.0;

/// How far an unload may be brought forward (hours).
pub const MAX_ADVANCE_UNLOAD_HOURS: f64 = 24.0;

/// How far a load may be brought forward (hours).
pub const MAX_ADVANCE_LOAD_HOURS: f64 = 12.0;

/// Fixed preparation time between finishing an unload and departing empty (hours).
pub const PREP_TIME_HOURS: f64 = 2.0;

/// Average laden truck speed on the port legs (km/h).
pub const TRUCK_SPEED_FULL_KMH: f64 = 25.0;

/// Average empty truck speed on the direct unload → load leg (km/h).
pub const TRUCK_SPEED_EMPTY_KMH: f64 = 40.0;

/// Score weight per kilometer saved.
pub const WEIGHT_SAVING: f64 = 1000.0;

/// Score penalty per hour of required schedule shift.
pub const PENALTY_PER_HOUR: f64 = 500.0;

/// Distance substituted for an unresolved port leg (km). Large enough that
/// such candidates lose to any fully-resolved alternative but still pair
/// when nothing better exists.
pub const UNRESOLVED_LEG_PENALTY_KM: f64 = 99_999.0;

/// Per-request timeout for the routing engine (seconds).
pub const ROUTE_TIMEOUT_SECS: u64 = 15;

/// Route request attempts before a leg is treated as unresolved.
pub const ROUTE_MAX_RETRIES: u32 = 3;

/// Base delay between route retries (seconds); grows linearly per attempt.
pub const ROUTE_RETRY_DELAY_SECS: u64 = 2;

/// Fallback service duration when no customer or branch profile exists (hours).
pub const DEFAULT_SERVICE_HOURS: f64 = 5.0;
