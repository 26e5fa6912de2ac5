//! Centralized default constants for the cadence system.
//!
//! **This module is the single source of truth** for all shared default
//! values. The other crates reference these constants instead of defining
//! their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// RECURRENCE ENGINE
// =============================================================================

/// Implicit expansion horizon, in calendar months, for rules whose end
/// condition is `Never`.
///
/// Bounds `expand` calls so an open-ended rule cannot produce an unbounded
/// sequence. This is a scope decision of the engine, not user-visible
/// behavior: callers asking for a wider window simply get nothing past the
/// horizon.
pub const NEVER_EXPANSION_HORIZON_MONTHS: u32 = 3;

/// Default step interval for a recurrence rule.
pub const DEFAULT_RULE_INTERVAL: u32 = 1;

// =============================================================================
// REMINDER LIFECYCLE
// =============================================================================

/// Window, in hours, within which an upcoming occurrence counts as imminent.
///
/// A reminder whose occurrence falls inside this window is created or
/// refreshed as `Active`; beyond it the reminder parks as `Inactive` until
/// the daily sweep advances it.
pub const REMINDER_IMMINENT_WINDOW_HOURS: i64 = 24;

/// Minutes per hour, used by the reminder message lead-time split.
pub const MINUTES_PER_HOUR: i64 = 60;

// =============================================================================
// SUGGESTION DETECTION
// =============================================================================

/// Minimum number of observed occurrences before the detector attempts
/// pattern classification. Below this it reports insufficient data.
pub const MIN_PATTERN_OCCURRENCES: usize = 3;

/// Candidate weight for a fixed day-gap (interval) pattern. Lowest priority:
/// an interval explains the least about the user's intent.
pub const PATTERN_WEIGHT_INTERVAL: u32 = 1;

/// Candidate weight for a weekly weekday-set pattern.
pub const PATTERN_WEIGHT_WEEKLY_SET: u32 = 2;

/// Candidate weight for a monthly day-of-month-set pattern. Equal to the
/// weekly weight; ties resolve toward the simpler explanation (fewer set
/// elements).
pub const PATTERN_WEIGHT_MONTHLY_SET: u32 = 2;

// =============================================================================
// SCHEDULED SWEEPS
// =============================================================================

/// Cron schedule for the daily reminder maintenance job (midnight):
/// regeneration sweep, then cleanup, then suggestion batch detection.
pub const MAINTENANCE_CRON: &str = "0 0 0 * * *";

/// Cron schedule for the account hard-delete sweep (off-peak, 03:00).
pub const ACCOUNT_PURGE_CRON: &str = "0 0 3 * * *";

/// Scheduler tick interval in seconds. One-minute resolution matches the
/// finest cron field in use.
pub const SCHEDULER_POLL_INTERVAL_SECS: u64 = 60;

// =============================================================================
// ACCOUNT RETENTION
// =============================================================================

/// Days a soft-deleted member is retained before the hard-delete sweep
/// removes the row and everything hanging off it.
pub const ACCOUNT_RETENTION_DAYS: i64 = 30;
