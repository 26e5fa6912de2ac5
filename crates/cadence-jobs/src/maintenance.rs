//! Scheduled maintenance sweeps.
//!
//! Two periodic jobs exist process-wide: the midnight maintenance pass
//! (reminder regeneration, then cleanup, then suggestion batch detection —
//! in that order) and the off-peak account purge for expired tombstones.
//! Both run to completion with per-item partial-failure semantics.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use cadence_core::defaults::ACCOUNT_RETENTION_DAYS;
use cadence_core::{
    CreateSuggestionRequest, Detection, MemberRepository, RecurringTargetSource,
    ReminderRepository, Result, SuggestionRepository, TargetHistory,
};
use cadence_engine::{detect, target_key};

use crate::invalidation::SuggestionInvalidationService;
use crate::lifecycle::ReminderLifecycleManager;
use crate::scheduler::Sweep;

// =============================================================================
// SUGGESTION BATCH
// =============================================================================

/// Outcome counts of one suggestion batch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Recurring targets examined.
    pub processed: usize,
    /// New suggestions created.
    pub suggested: usize,
    /// Targets with no stable pattern or an identical outstanding
    /// suggestion.
    pub skipped: usize,
    /// Targets skipped after a caught failure.
    pub failed: usize,
}

/// Runs the pattern detector over every recurring target's history and
/// materializes suggestions.
pub struct SuggestionBatch {
    targets: Arc<dyn RecurringTargetSource>,
    suggestions: Arc<dyn SuggestionRepository>,
    invalidation: Arc<SuggestionInvalidationService>,
}

impl SuggestionBatch {
    pub fn new(
        targets: Arc<dyn RecurringTargetSource>,
        suggestions: Arc<dyn SuggestionRepository>,
        invalidation: Arc<SuggestionInvalidationService>,
    ) -> Self {
        Self {
            targets,
            suggestions,
            invalidation,
        }
    }

    /// One complete pass over all recurring targets.
    pub async fn run_once(&self) -> BatchStats {
        let start = Instant::now();
        let mut stats = BatchStats::default();

        let histories = match self.targets.list_recurring_histories().await {
            Ok(histories) => histories,
            Err(e) => {
                warn!(error = %e, "suggestion batch could not list recurring targets");
                return stats;
            }
        };

        for history in histories {
            stats.processed += 1;
            match self.process_target(&history).await {
                Ok(Some(_)) => stats.suggested += 1,
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    stats.failed += 1;
                    warn!(
                        target_id = %history.target_id,
                        member_id = %history.member_id,
                        error = %e,
                        "suggestion batch item failed; skipped"
                    );
                }
            }
        }

        info!(
            processed = stats.processed,
            suggested = stats.suggested,
            skipped = stats.skipped,
            failed = stats.failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "suggestion batch complete"
        );
        stats
    }

    /// Detect and materialize a suggestion for one target.
    ///
    /// Dedup is content-addressed: an identical active suggestion makes
    /// this a no-op, while a differing one is retired (superseded) before
    /// the replacement is inserted. The retirement goes through the
    /// invalidation service directly so it commits before the insert — the
    /// bus path stays reserved for upstream domain mutations.
    async fn process_target(&self, history: &TargetHistory) -> Result<Option<Uuid>> {
        let suggestion = match detect(&history.occurrences) {
            Detection::Suggestion(suggestion) => suggestion,
            Detection::InsufficientData | Detection::NoSuggestion => return Ok(None),
        };

        let hash = target_key::hash_key(&target_key::group_key(history.target_id));
        let content = serde_json::to_string(&suggestion)?;

        let outstanding = self
            .suggestions
            .find_active_by_hash(history.member_id, &hash)
            .await?;
        if outstanding.iter().any(|s| s.content == content) {
            return Ok(None);
        }
        if !outstanding.is_empty() {
            self.invalidation
                .invalidate(history.member_id, &hash)
                .await?;
        }

        let id = self
            .suggestions
            .create(CreateSuggestionRequest {
                content,
                category: suggestion.value.category().to_string(),
                target_hash: hash,
                member_id: history.member_id,
            })
            .await?;
        Ok(Some(id))
    }
}

// =============================================================================
// DAILY MAINTENANCE
// =============================================================================

/// Midnight maintenance: reminder regeneration, cleanup, then the
/// suggestion batch. The ordering is load-bearing — cleanup must see the
/// terminations the refresh produced.
pub struct DailyMaintenance {
    lifecycle: Arc<ReminderLifecycleManager>,
    batch: SuggestionBatch,
}

impl DailyMaintenance {
    pub fn new(lifecycle: Arc<ReminderLifecycleManager>, batch: SuggestionBatch) -> Self {
        Self { lifecycle, batch }
    }
}

#[async_trait]
impl Sweep for DailyMaintenance {
    fn name(&self) -> &'static str {
        "reminder_maintenance"
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<()> {
        self.lifecycle.refresh_expired(now).await;
        self.lifecycle.cleanup().await?;
        self.batch.run_once().await;
        Ok(())
    }
}

// =============================================================================
// ACCOUNT PURGE
// =============================================================================

/// Off-peak hard-delete of soft-deleted accounts past the retention window,
/// cascading reminders and suggestions before the member row itself.
pub struct AccountPurge {
    members: Arc<dyn MemberRepository>,
    reminders: Arc<dyn ReminderRepository>,
    suggestions: Arc<dyn SuggestionRepository>,
}

impl AccountPurge {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        reminders: Arc<dyn ReminderRepository>,
        suggestions: Arc<dyn SuggestionRepository>,
    ) -> Self {
        Self {
            members,
            reminders,
            suggestions,
        }
    }

    async fn purge_member(&self, member_id: Uuid) -> Result<()> {
        let reminders = self.reminders.delete_by_member(member_id).await?;
        let suggestions = self.suggestions.delete_by_member(member_id).await?;
        self.members.hard_delete(member_id).await?;
        info!(
            member_id = %member_id,
            reminders,
            suggestions,
            "expired account purged"
        );
        Ok(())
    }
}

#[async_trait]
impl Sweep for AccountPurge {
    fn name(&self) -> &'static str {
        "account_purge"
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<()> {
        let cutoff = now - Duration::days(ACCOUNT_RETENTION_DAYS);
        let expired = self.members.list_expired_tombstones(cutoff).await?;
        let total = expired.len();
        let mut failed = 0usize;

        for member in expired {
            if let Err(e) = self.purge_member(member.id).await {
                failed += 1;
                warn!(
                    member_id = %member.id,
                    error = %e,
                    "account purge failed for member; skipped"
                );
            }
        }

        info!(processed = total, skipped = failed, "account purge complete");
        Ok(())
    }
}
