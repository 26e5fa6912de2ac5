//! Domain change notifications and the post-commit change bus.
//!
//! Upstream mutations (plan edits, exception edits, deletions) are not
//! allowed to reach the reminder and suggestion machinery until their
//! transaction has committed — a rollback must never leave derived state
//! behind. The write path therefore stages events on a [`TxOutbox`] and
//! forwards them to the [`ChangeBus`] only from `commit()`; dropping an
//! uncommitted outbox discards everything it staged.
//!
//! Delivery downstream is at-least-once: the single consumer task may
//! observe an event again after a crash-restart replays recent mutations,
//! so every handler is required to be idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::TargetType;

// =============================================================================
// PAYLOADS
// =============================================================================

/// Which instances of a recurring series a mutation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
    /// Only the one instance at the carried occurrence time.
    Single,
    /// The instance at the carried occurrence time and every later one.
    ThisAndFollowing,
}

/// Why outstanding suggestions for a target stopped applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    PlanEdited,
    PlanDeleted,
    Superseded,
}

impl InvalidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationReason::PlanEdited => "plan_edited",
            InvalidationReason::PlanDeleted => "plan_deleted",
            InvalidationReason::Superseded => "superseded",
        }
    }
}

/// Domain change notification, published after the originating transaction
/// commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    /// An event or to-do was created or modified.
    PlanChanged {
        event_id: Uuid,
        member_id: Uuid,
        title: String,
        occurrence_time: DateTime<Utc>,
        target_type: TargetType,
    },
    /// A single instance of a recurring series was edited.
    RecurrenceExceptionChanged {
        exception_id: Uuid,
        event_id: Uuid,
        target_type: TargetType,
        member_id: Uuid,
        title: String,
        occurrence_time: DateTime<Utc>,
        is_recurring: bool,
        change_type: ChangeScope,
    },
    /// An instance (or tail of instances) was deleted out from under its
    /// reminder.
    ReminderDeleted {
        exception_id: Uuid,
        member_id: Uuid,
        occurrence_time: DateTime<Utc>,
        target_id: Uuid,
        target_type: TargetType,
        deleted_type: ChangeScope,
    },
    /// Outstanding suggestions keyed on the hash no longer apply.
    SuggestionInvalidate {
        member_id: Uuid,
        target_key_hash: String,
        reason: InvalidationReason,
    },
}

impl ChangeEvent {
    /// Namespaced event type name, used in logs and dispatch tracing.
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::PlanChanged { .. } => "plan.changed",
            ChangeEvent::RecurrenceExceptionChanged { .. } => "recurrence_exception.changed",
            ChangeEvent::ReminderDeleted { .. } => "reminder.deleted",
            ChangeEvent::SuggestionInvalidate { .. } => "suggestion.invalidate",
        }
    }

    /// Member whose data the event concerns.
    pub fn member_id(&self) -> Uuid {
        match self {
            ChangeEvent::PlanChanged { member_id, .. }
            | ChangeEvent::RecurrenceExceptionChanged { member_id, .. }
            | ChangeEvent::ReminderDeleted { member_id, .. }
            | ChangeEvent::SuggestionInvalidate { member_id, .. } => *member_id,
        }
    }
}

// =============================================================================
// CHANGE BUS
// =============================================================================

/// Producer half of the post-commit notification channel.
///
/// Cheap to clone; every write path holds one and opens a [`TxOutbox`] per
/// transaction. An unbounded channel is deliberate: publishers sit inside
/// commit paths and must never block or drop on backpressure — the single
/// consumer drains continuously.
#[derive(Clone)]
pub struct ChangeBus {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChangeBus {
    /// Create the bus and its consumer end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Open an outbox for one transaction.
    pub fn outbox(&self) -> TxOutbox {
        TxOutbox {
            staged: Vec::new(),
            tx: self.tx.clone(),
        }
    }

    fn send(&self, event: ChangeEvent) {
        tracing::debug!(
            event_type = event.event_type(),
            member_id = %event.member_id(),
            "change event published"
        );
        if self.tx.send(event).is_err() {
            tracing::warn!("change bus has no consumer; event dropped");
        }
    }
}

/// Per-transaction staging buffer for change events.
///
/// `stage` collects events while the transaction is open; `commit` forwards
/// them in staging order after the database commit succeeded. Dropping the
/// outbox without committing models a rollback: staged events vanish.
pub struct TxOutbox {
    staged: Vec<ChangeEvent>,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl TxOutbox {
    /// Stage an event for publication on commit.
    pub fn stage(&mut self, event: ChangeEvent) {
        self.staged.push(event);
    }

    /// Number of events currently staged.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Publish every staged event, in order. Call only after the
    /// originating transaction committed.
    pub fn commit(self) {
        let bus = ChangeBus {
            tx: self.tx.clone(),
        };
        for event in self.staged {
            bus.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan_changed(member_id: Uuid) -> ChangeEvent {
        ChangeEvent::PlanChanged {
            event_id: Uuid::new_v4(),
            member_id,
            title: "weekly review".to_string(),
            occurrence_time: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            target_type: TargetType::Event,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_staged_events_in_order() {
        let (bus, mut rx) = ChangeBus::channel();
        let member_id = Uuid::new_v4();

        let mut outbox = bus.outbox();
        outbox.stage(plan_changed(member_id));
        outbox.stage(ChangeEvent::SuggestionInvalidate {
            member_id,
            target_key_hash: "abc123".to_string(),
            reason: InvalidationReason::PlanEdited,
        });
        assert_eq!(outbox.staged_len(), 2);
        outbox.commit();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event_type(), "plan.changed");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event_type(), "suggestion.invalidate");
    }

    #[tokio::test]
    async fn test_dropped_outbox_publishes_nothing() {
        let (bus, mut rx) = ChangeBus::channel();

        {
            let mut outbox = bus.outbox();
            outbox.stage(plan_changed(Uuid::new_v4()));
            // Rolled back: outbox dropped without commit.
        }

        // A second committed outbox proves the channel stayed healthy and
        // that nothing from the rolled-back transaction leaked through.
        let marker = Uuid::new_v4();
        let mut outbox = bus.outbox();
        outbox.stage(plan_changed(marker));
        outbox.commit();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.member_id(), marker);
    }

    #[tokio::test]
    async fn test_empty_commit_is_a_no_op() {
        let (bus, mut rx) = ChangeBus::channel();
        bus.outbox().commit();
        drop(bus);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_publish_without_consumer_does_not_panic() {
        let (bus, rx) = ChangeBus::channel();
        drop(rx);
        let mut outbox = bus.outbox();
        outbox.stage(plan_changed(Uuid::new_v4()));
        outbox.commit();
    }

    #[test]
    fn test_event_type_names() {
        let member_id = Uuid::new_v4();
        let time = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        assert_eq!(plan_changed(member_id).event_type(), "plan.changed");
        assert_eq!(
            ChangeEvent::RecurrenceExceptionChanged {
                exception_id: Uuid::new_v4(),
                event_id: Uuid::new_v4(),
                target_type: TargetType::Event,
                member_id,
                title: String::new(),
                occurrence_time: time,
                is_recurring: true,
                change_type: ChangeScope::Single,
            }
            .event_type(),
            "recurrence_exception.changed"
        );
        assert_eq!(
            ChangeEvent::ReminderDeleted {
                exception_id: Uuid::new_v4(),
                member_id,
                occurrence_time: time,
                target_id: Uuid::new_v4(),
                target_type: TargetType::Todo,
                deleted_type: ChangeScope::ThisAndFollowing,
            }
            .event_type(),
            "reminder.deleted"
        );
    }

    #[test]
    fn test_event_serde_round_trip() {
        let event = ChangeEvent::SuggestionInvalidate {
            member_id: Uuid::nil(),
            target_key_hash: "deadbeef".to_string(),
            reason: InvalidationReason::Superseded,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"SuggestionInvalidate"#));
        assert!(json.contains(r#""reason":"superseded"#));
        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
