//! Core traits for cadence abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy: the persistence boundary for reminders, suggestions, and member
//! tombstones, and the capability boundaries toward the owning event/to-do
//! domain. No core logic lives behind them — they exist so the engine and
//! job machinery stay testable with in-memory doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    LifecycleStatus, Member, NextOccurrenceResult, Reminder, Suggestion, SuggestionStatus,
    TargetHistory, TargetType,
};

// =============================================================================
// DOMAIN QUERY CAPABILITIES
// =============================================================================

/// Query capability of the domain owning a reminder target (event or to-do).
///
/// Implementations are expected to run the recurrence engine against the
/// item's stored rule. A vanished item or a one-off with no future instance
/// answers [`NextOccurrenceResult::none`], never an error.
#[async_trait]
pub trait OccurrenceSource: Send + Sync {
    async fn calculate_next_occurrence(
        &self,
        target_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<NextOccurrenceResult>;
}

/// Source of occurrence histories for the suggestion batch.
#[async_trait]
pub trait RecurringTargetSource: Send + Sync {
    /// Every recurring target with its recent occurrence history, oldest
    /// occurrence first.
    async fn list_recurring_histories(&self) -> Result<Vec<TargetHistory>>;
}

// =============================================================================
// REMINDER REPOSITORY
// =============================================================================

/// Request for creating a new reminder row.
#[derive(Debug, Clone)]
pub struct CreateReminderRequest {
    pub title: String,
    pub occurrence_time: DateTime<Utc>,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub member_id: Uuid,
    pub lifecycle_status: LifecycleStatus,
}

/// Repository for reminder rows.
///
/// Only the lifecycle manager writes through this interface. Terminated is
/// absorbing: mutating operations must refuse to touch terminated rows.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Insert a new reminder.
    async fn create(&self, req: CreateReminderRequest) -> Result<Uuid>;

    /// Fetch a reminder by id.
    async fn fetch(&self, id: Uuid) -> Result<Reminder>;

    /// All reminders pointing at a target, any lifecycle status.
    async fn find_by_target(
        &self,
        target_id: Uuid,
        target_type: TargetType,
    ) -> Result<Vec<Reminder>>;

    /// Active/inactive reminders whose occurrence time has passed.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>>;

    /// Advance a reminder to its next occurrence, re-deriving the lifecycle
    /// status and resetting interaction to pending. Returns `false` without
    /// touching the row when it is terminated or missing.
    async fn advance_occurrence(
        &self,
        id: Uuid,
        occurrence_time: DateTime<Utc>,
        status: LifecycleStatus,
        title: Option<&str>,
    ) -> Result<bool>;

    /// Terminate one reminder. No-op (returns `false`) when already
    /// terminated.
    async fn terminate(&self, id: Uuid) -> Result<bool>;

    /// Terminate the reminder for the single instance at `occurrence_time`.
    /// Returns the number of rows affected.
    async fn terminate_at(
        &self,
        target_id: Uuid,
        target_type: TargetType,
        occurrence_time: DateTime<Utc>,
    ) -> Result<u64>;

    /// Terminate every reminder for the target at or after `from`.
    async fn terminate_following(
        &self,
        target_id: Uuid,
        target_type: TargetType,
        from: DateTime<Utc>,
    ) -> Result<u64>;

    /// Physically delete every terminated row. Returns the count removed.
    async fn delete_terminated(&self) -> Result<u64>;

    /// Physically delete every reminder belonging to a member.
    async fn delete_by_member(&self, member_id: Uuid) -> Result<u64>;
}

// =============================================================================
// SUGGESTION REPOSITORY
// =============================================================================

/// Request for creating a new suggestion row.
#[derive(Debug, Clone)]
pub struct CreateSuggestionRequest {
    pub content: String,
    pub category: String,
    pub target_hash: String,
    pub member_id: Uuid,
}

/// Repository for suggestion rows.
///
/// Writes happen only through the batch job and the invalidation service.
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// Insert a new suggestion in `Primary` status.
    async fn create(&self, req: CreateSuggestionRequest) -> Result<Uuid>;

    /// Fetch a suggestion by id.
    async fn fetch(&self, id: Uuid) -> Result<Suggestion>;

    /// Active suggestions for a member whose stored target hash matches.
    async fn find_active_by_hash(
        &self,
        member_id: Uuid,
        target_hash: &str,
    ) -> Result<Vec<Suggestion>>;

    /// Move a suggestion along the monotonic status order; violations
    /// surface as [`crate::Error::InvalidTransition`].
    async fn update_status(&self, id: Uuid, to: SuggestionStatus) -> Result<()>;

    /// Bulk-mark every matching active suggestion inactive. Idempotent;
    /// returns the number of rows actually flipped.
    async fn invalidate_by_hash(&self, member_id: Uuid, target_hash: &str) -> Result<u64>;

    /// Physically delete every suggestion belonging to a member.
    async fn delete_by_member(&self, member_id: Uuid) -> Result<u64>;
}

// =============================================================================
// MEMBER REPOSITORY
// =============================================================================

/// Repository view of member accounts for the retention sweep.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Soft-deleted members whose tombstone is at or before `cutoff`.
    async fn list_expired_tombstones(&self, cutoff: DateTime<Utc>) -> Result<Vec<Member>>;

    /// Hard-delete the member row itself. Dependent reminder/suggestion
    /// rows are removed by their own repositories first.
    async fn hard_delete(&self, member_id: Uuid) -> Result<()>;
}
