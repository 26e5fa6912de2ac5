//! Reminder lifecycle management.
//!
//! The manager owns every write to reminder rows. It reacts to post-commit
//! change notifications (create/refresh/terminate) and drives the daily
//! sweep that advances expired reminders to their next occurrence or
//! retires them. Terminated is absorbing: the repository guards refuse to
//! touch terminated rows, and nothing here re-creates one.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use cadence_core::{
    ChangeScope, CreateReminderRequest, LifecycleStatus, ReminderRepository, Result, TargetType,
};

use crate::provider::OccurrenceProvider;

/// Outcome counts of one refresh sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Reminders examined.
    pub processed: usize,
    /// Advanced to a later occurrence.
    pub advanced: usize,
    /// Retired because no next occurrence exists.
    pub terminated: usize,
    /// Skipped after a caught per-item failure.
    pub failed: usize,
}

/// Owns the reminder state machine.
pub struct ReminderLifecycleManager {
    reminders: Arc<dyn ReminderRepository>,
    provider: Arc<OccurrenceProvider>,
}

impl ReminderLifecycleManager {
    pub fn new(
        reminders: Arc<dyn ReminderRepository>,
        provider: Arc<OccurrenceProvider>,
    ) -> Self {
        Self {
            reminders,
            provider,
        }
    }

    // =========================================================================
    // CHANGE-NOTIFICATION REACTIONS
    // =========================================================================

    /// A plan (event or to-do) was created or modified: upsert its reminder.
    ///
    /// Idempotent under at-least-once delivery — replaying the notification
    /// re-applies the same occurrence time and status.
    pub async fn on_plan_changed(
        &self,
        target_id: Uuid,
        member_id: Uuid,
        title: &str,
        occurrence_time: DateTime<Utc>,
        target_type: TargetType,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let status = LifecycleStatus::for_occurrence(occurrence_time, now);
        let existing = self.reminders.find_by_target(target_id, target_type).await?;

        match existing.iter().find(|r| !r.lifecycle_status.is_terminal()) {
            Some(reminder) => {
                let updated = self
                    .reminders
                    .advance_occurrence(reminder.id, occurrence_time, status, Some(title))
                    .await?;
                debug!(
                    reminder_id = %reminder.id,
                    target_id = %target_id,
                    updated,
                    "reminder refreshed from plan change"
                );
            }
            None => {
                let id = self
                    .reminders
                    .create(CreateReminderRequest {
                        title: title.to_string(),
                        occurrence_time,
                        target_type,
                        target_id,
                        member_id,
                        lifecycle_status: status,
                    })
                    .await?;
                debug!(
                    reminder_id = %id,
                    target_id = %target_id,
                    ?status,
                    "reminder created from plan change"
                );
            }
        }
        Ok(())
    }

    /// A single instance was edited out of a recurring series, or a plan was
    /// deleted: retire the affected reminder instances.
    pub async fn on_instances_removed(
        &self,
        target_id: Uuid,
        target_type: TargetType,
        occurrence_time: DateTime<Utc>,
        scope: ChangeScope,
    ) -> Result<u64> {
        let affected = match scope {
            ChangeScope::Single => {
                self.reminders
                    .terminate_at(target_id, target_type, occurrence_time)
                    .await?
            }
            ChangeScope::ThisAndFollowing => {
                self.reminders
                    .terminate_following(target_id, target_type, occurrence_time)
                    .await?
            }
        };
        debug!(
            target_id = %target_id,
            ?scope,
            affected,
            "reminder instances terminated"
        );
        Ok(affected)
    }

    // =========================================================================
    // SWEEPS
    // =========================================================================

    /// Daily refresh: every active/inactive reminder whose occurrence time
    /// has passed is advanced to its target's next occurrence, or
    /// terminated when none exists.
    ///
    /// Partial-failure semantics: one reminder failing is logged and
    /// skipped, the batch continues, and nothing retries within this run —
    /// the next scheduled sweep re-evaluates naturally.
    pub async fn refresh_expired(&self, now: DateTime<Utc>) -> SweepStats {
        let start = Instant::now();
        let mut stats = SweepStats::default();

        let due = match self.reminders.find_due(now).await {
            Ok(due) => due,
            Err(e) => {
                warn!(error = %e, "refresh sweep could not list due reminders");
                return stats;
            }
        };

        for reminder in due {
            stats.processed += 1;
            match self.refresh_one(&reminder, now).await {
                Ok(true) => stats.advanced += 1,
                Ok(false) => stats.terminated += 1,
                Err(e) => {
                    stats.failed += 1;
                    warn!(
                        reminder_id = %reminder.id,
                        target_id = %reminder.target_id,
                        error = %e,
                        "reminder refresh failed; item skipped"
                    );
                }
            }
        }

        info!(
            processed = stats.processed,
            advanced = stats.advanced,
            terminated = stats.terminated,
            skipped = stats.failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "reminder refresh sweep complete"
        );
        stats
    }

    /// Refresh one reminder. `Ok(true)` advanced, `Ok(false)` terminated.
    async fn refresh_one(
        &self,
        reminder: &cadence_core::Reminder,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match self.provider.next_occurrence_of(reminder, now).await? {
            Some(occurrence) => {
                let status = LifecycleStatus::for_occurrence(occurrence.occurrence_time, now);
                self.reminders
                    .advance_occurrence(
                        reminder.id,
                        occurrence.occurrence_time,
                        status,
                        Some(&occurrence.title),
                    )
                    .await?;
                Ok(true)
            }
            None => {
                self.reminders.terminate(reminder.id).await?;
                Ok(false)
            }
        }
    }

    /// Cleanup: physically delete every terminated reminder.
    pub async fn cleanup(&self) -> Result<u64> {
        let removed = self.reminders.delete_terminated().await?;
        info!(affected = removed, "terminated reminders cleaned up");
        Ok(removed)
    }
}
