//! Structured logging schema and field name constants for cadence.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, item skipped or fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), sweep completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (expanded occurrences) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "engine", "db", "jobs", "listener", "scheduler"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "lifecycle", "invalidation", "detector", "pool", "maintenance"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "refresh_expired", "cleanup", "invalidate", "dispatch"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Member UUID the operation is scoped to.
pub const MEMBER_ID: &str = "member_id";

/// Reminder UUID being operated on.
pub const REMINDER_ID: &str = "reminder_id";

/// Suggestion UUID being operated on.
pub const SUGGESTION_ID: &str = "suggestion_id";

/// Target (event or to-do) UUID a reminder or suggestion points at.
pub const TARGET_ID: &str = "target_id";

/// Target type discriminator ("event" / "todo").
pub const TARGET_TYPE: &str = "target_type";

/// Change-notification variant name.
pub const EVENT_TYPE: &str = "event_type";

/// Target-key digest driving an invalidation.
pub const TARGET_HASH: &str = "target_hash";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Rows/items affected by a bulk operation.
pub const AFFECTED: &str = "affected";

/// Items processed by a sweep.
pub const PROCESSED: &str = "processed";

/// Items skipped after a caught per-item failure.
pub const SKIPPED: &str = "skipped";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
