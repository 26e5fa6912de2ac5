//! Domain models: occurrences, reminders, suggestions, members.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::REMINDER_IMMINENT_WINDOW_HOURS;
use crate::error::{Error, Result};

// =============================================================================
// TARGET TYPE
// =============================================================================

/// Kind of item a reminder or suggestion points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Event,
    Todo,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Event => "event",
            TargetType::Todo => "todo",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "event" => Some(TargetType::Event),
            "todo" => Some(TargetType::Todo),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OCCURRENCE
// =============================================================================

/// One concrete, dated instance implied by a recurrence rule.
///
/// Ephemeral — computed on demand by the engine or an occurrence source,
/// never persisted as its own row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub target_id: Uuid,
    pub target_type: TargetType,
    pub occurrence_time: DateTime<Utc>,
    pub title: String,
    pub is_recurring: bool,
}

/// Answer to "what is the next occurrence of this target".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOccurrenceResult {
    pub has_next: bool,
    pub next_time: Option<DateTime<Utc>>,
    /// Current title of the owning item, when known. Lets the sweep pick up
    /// renames without a second query.
    pub next_title: Option<String>,
    /// Whether the owning item repeats past this instance.
    pub is_recurring: bool,
}

impl NextOccurrenceResult {
    /// A future instance of a recurring series exists.
    pub fn recurring(time: DateTime<Utc>, title: Option<String>) -> Self {
        Self {
            has_next: true,
            next_time: Some(time),
            next_title: title,
            is_recurring: true,
        }
    }

    /// A one-off item whose single instance is still ahead.
    pub fn one_off(time: DateTime<Utc>, title: Option<String>) -> Self {
        Self {
            has_next: true,
            next_time: Some(time),
            next_title: title,
            is_recurring: false,
        }
    }

    /// No future instance: a one-off in the past, or the owning item no
    /// longer exists. Deliberately not an error — the caller decides what
    /// absence means.
    pub fn none() -> Self {
        Self {
            has_next: false,
            next_time: None,
            next_title: None,
            is_recurring: false,
        }
    }
}

// =============================================================================
// REMINDER
// =============================================================================

/// ACTIVE/INACTIVE/TERMINATED state of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Eligible to fire.
    Active,
    /// A future occurrence exists but is not yet actionable.
    Inactive,
    /// Pending physical deletion. Absorbing — nothing transitions out.
    Terminated,
}

impl LifecycleStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleStatus::Terminated)
    }

    /// Derive the live status for an occurrence relative to `now`: imminent
    /// occurrences are `Active`, everything further out parks as `Inactive`.
    pub fn for_occurrence(occurrence_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if occurrence_time - now <= Duration::hours(REMINDER_IMMINENT_WINDOW_HOURS) {
            LifecycleStatus::Active
        } else {
            LifecycleStatus::Inactive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "active",
            LifecycleStatus::Inactive => "inactive",
            LifecycleStatus::Terminated => "terminated",
        }
    }
}

/// How the member has interacted with a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Pending,
    Checked,
    Dismissed,
}

impl InteractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Pending => "pending",
            InteractionStatus::Checked => "checked",
            InteractionStatus::Dismissed => "dismissed",
        }
    }
}

/// Persisted notification intent tied to the next unfired occurrence of an
/// event or to-do.
///
/// `target_id` is a back-reference to the owning item, not an ownership
/// edge: the reminder outlives nothing and owns nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    /// The single next unfired instance for the target — never a past time
    /// once refreshed, never more than one instance ahead.
    pub occurrence_time: DateTime<Utc>,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub interaction_status: InteractionStatus,
    pub lifecycle_status: LifecycleStatus,
    pub member_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Build a fresh reminder for a target occurrence, deriving the
    /// lifecycle status from imminence relative to `now`.
    pub fn new(
        title: impl Into<String>,
        occurrence_time: DateTime<Utc>,
        target_type: TargetType,
        target_id: Uuid,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            occurrence_time,
            target_type,
            target_id,
            interaction_status: InteractionStatus::Pending,
            lifecycle_status: LifecycleStatus::for_occurrence(occurrence_time, now),
            member_id,
            created_at: now,
        }
    }
}

// =============================================================================
// SUGGESTION
// =============================================================================

/// Review state of an AI-assisted suggestion.
///
/// Transitions are monotonic: `Primary → Secondary → {Accepted | Rejected}`,
/// or `Primary → {Accepted | Rejected}` directly. Nothing moves backwards
/// and the terminal states absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Primary,
    Secondary,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Primary => "primary",
            SuggestionStatus::Secondary => "secondary",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SuggestionStatus::Accepted | SuggestionStatus::Rejected)
    }

    /// Whether moving from `self` to `to` respects the monotonic order.
    pub fn can_transition(&self, to: SuggestionStatus) -> bool {
        use SuggestionStatus::*;
        matches!(
            (self, to),
            (Primary, Secondary) | (Primary, Accepted) | (Primary, Rejected)
                | (Secondary, Accepted)
                | (Secondary, Rejected)
        )
    }

    /// Validate a transition, surfacing violations as a domain error.
    pub fn checked_transition(&self, to: SuggestionStatus) -> Result<SuggestionStatus> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(Error::InvalidTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }
}

/// AI-assisted proposal derived from observed behavior, e.g. "make this
/// recurring".
///
/// Retirement is content-addressed: a bulk operation keyed on
/// `(member_id, target_hash)` flips `is_active`, never an update by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    /// Serialized pattern payload; a downstream collaborator phrases it.
    pub content: String,
    /// Pattern category slug ("interval", "weekly_set", "monthly_set").
    pub category: String,
    pub status: SuggestionStatus,
    /// Hex SHA-256 digest of the canonical target key.
    pub target_hash: String,
    /// False once retired by invalidation.
    pub is_active: bool,
    pub member_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// MEMBER
// =============================================================================

/// Account row as seen by the retention sweep: a tombstone with expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    /// Soft-delete timestamp. `None` for live accounts.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Whether the tombstone is old enough to hard-delete.
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        matches!(self.deleted_at, Some(t) if t <= cutoff)
    }
}

// =============================================================================
// TARGET HISTORY
// =============================================================================

/// Occurrence history of one recurring target, as handed to the suggestion
/// batch by the owning domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHistory {
    pub target_id: Uuid,
    pub target_type: TargetType,
    pub member_id: Uuid,
    pub title: String,
    /// Prior occurrence timestamps, oldest first.
    pub occurrences: Vec<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_target_type_round_trip() {
        for t in [TargetType::Event, TargetType::Todo] {
            assert_eq!(TargetType::from_str_loose(t.as_str()), Some(t));
        }
        assert_eq!(TargetType::from_str_loose("EVENT"), Some(TargetType::Event));
        assert_eq!(TargetType::from_str_loose("plan"), None);
    }

    #[test]
    fn test_lifecycle_status_imminence() {
        let now = at(9);
        // Inside the 24h window — active.
        let soon = now + Duration::hours(3);
        assert_eq!(
            LifecycleStatus::for_occurrence(soon, now),
            LifecycleStatus::Active
        );
        // Beyond it — inactive.
        let later = now + Duration::hours(48);
        assert_eq!(
            LifecycleStatus::for_occurrence(later, now),
            LifecycleStatus::Inactive
        );
        // Exactly on the boundary counts as imminent.
        let edge = now + Duration::hours(REMINDER_IMMINENT_WINDOW_HOURS);
        assert_eq!(
            LifecycleStatus::for_occurrence(edge, now),
            LifecycleStatus::Active
        );
    }

    #[test]
    fn test_terminated_is_terminal() {
        assert!(LifecycleStatus::Terminated.is_terminal());
        assert!(!LifecycleStatus::Active.is_terminal());
        assert!(!LifecycleStatus::Inactive.is_terminal());
    }

    #[test]
    fn test_reminder_new_derives_status() {
        let now = at(9);
        let reminder = Reminder::new(
            "standup",
            now + Duration::hours(1),
            TargetType::Event,
            Uuid::new_v4(),
            Uuid::new_v4(),
            now,
        );
        assert_eq!(reminder.lifecycle_status, LifecycleStatus::Active);
        assert_eq!(reminder.interaction_status, InteractionStatus::Pending);
    }

    #[test]
    fn test_next_occurrence_result_constructors() {
        let r = NextOccurrenceResult::recurring(at(10), Some("weekly review".into()));
        assert!(r.has_next);
        assert!(r.is_recurring);
        assert_eq!(r.next_time, Some(at(10)));

        let single = NextOccurrenceResult::one_off(at(11), None);
        assert!(single.has_next);
        assert!(!single.is_recurring);

        let none = NextOccurrenceResult::none();
        assert!(!none.has_next);
        assert!(none.next_time.is_none());
        assert!(none.next_title.is_none());
        assert!(!none.is_recurring);
    }

    #[test]
    fn test_suggestion_status_allowed_transitions() {
        use SuggestionStatus::*;
        assert!(Primary.can_transition(Secondary));
        assert!(Primary.can_transition(Accepted));
        assert!(Primary.can_transition(Rejected));
        assert!(Secondary.can_transition(Accepted));
        assert!(Secondary.can_transition(Rejected));
    }

    #[test]
    fn test_suggestion_status_forbidden_transitions() {
        use SuggestionStatus::*;
        // No backwards moves, no leaving a terminal state, no self-loops.
        assert!(!Secondary.can_transition(Primary));
        assert!(!Accepted.can_transition(Rejected));
        assert!(!Rejected.can_transition(Primary));
        assert!(!Primary.can_transition(Primary));

        let err = Accepted.checked_transition(Primary).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[test]
    fn test_member_tombstone_expiry() {
        let cutoff = at(0);
        let live = Member {
            id: Uuid::new_v4(),
            deleted_at: None,
        };
        assert!(!live.is_expired(cutoff));

        let fresh = Member {
            id: Uuid::new_v4(),
            deleted_at: Some(cutoff + Duration::days(1)),
        };
        assert!(!fresh.is_expired(cutoff));

        let expired = Member {
            id: Uuid::new_v4(),
            deleted_at: Some(cutoff - Duration::days(1)),
        };
        assert!(expired.is_expired(cutoff));
    }
}
