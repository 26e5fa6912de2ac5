//! Content-addressed suggestion invalidation.
//!
//! Any mutation that could make an outstanding suggestion stale publishes an
//! invalidation keyed on the target's canonical hash. Publication is
//! fire-and-forget through the transaction outbox; consumption bulk-marks
//! matching suggestions inactive in its own transaction, after and
//! independent of the triggering write. Both sides are idempotent.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use cadence_core::{ChangeEvent, InvalidationReason, Result, SuggestionRepository, TxOutbox};

/// Retires stale suggestions by target-key hash.
pub struct SuggestionInvalidationService {
    suggestions: Arc<dyn SuggestionRepository>,
}

impl SuggestionInvalidationService {
    pub fn new(suggestions: Arc<dyn SuggestionRepository>) -> Self {
        Self { suggestions }
    }

    /// Stage an invalidation notification on the write path's outbox.
    ///
    /// No-op when the hash is empty — an empty canonical key means the
    /// mutation had no addressable subject, and retiring nothing is the
    /// correct reading.
    pub fn publish(
        outbox: &mut TxOutbox,
        member_id: Uuid,
        reason: InvalidationReason,
        target_key_hash: &str,
    ) {
        if target_key_hash.is_empty() {
            debug!(member_id = %member_id, "empty target hash; invalidation not published");
            return;
        }
        outbox.stage(ChangeEvent::SuggestionInvalidate {
            member_id,
            target_key_hash: target_key_hash.to_string(),
            reason,
        });
    }

    /// Bulk-mark every active suggestion with the hash inactive.
    ///
    /// Idempotent: re-invalidating an already-inactive set affects zero rows
    /// and is not an error. Returns the number of rows actually flipped.
    pub async fn invalidate(&self, member_id: Uuid, target_key_hash: &str) -> Result<u64> {
        if target_key_hash.is_empty() {
            return Ok(0);
        }
        let affected = self
            .suggestions
            .invalidate_by_hash(member_id, target_key_hash)
            .await?;
        if affected > 0 {
            info!(
                member_id = %member_id,
                target_hash = %target_key_hash,
                affected,
                "stale suggestions retired"
            );
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::ChangeBus;

    #[tokio::test]
    async fn test_publish_stages_on_outbox() {
        let (bus, mut rx) = ChangeBus::channel();
        let member_id = Uuid::new_v4();

        let mut outbox = bus.outbox();
        SuggestionInvalidationService::publish(
            &mut outbox,
            member_id,
            InvalidationReason::PlanDeleted,
            "a1b2c3",
        );
        assert_eq!(outbox.staged_len(), 1);
        outbox.commit();

        match rx.recv().await.unwrap() {
            ChangeEvent::SuggestionInvalidate {
                member_id: got,
                target_key_hash,
                reason,
            } => {
                assert_eq!(got, member_id);
                assert_eq!(target_key_hash, "a1b2c3");
                assert_eq!(reason, InvalidationReason::PlanDeleted);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_with_empty_hash_is_a_no_op() {
        let (bus, _rx) = ChangeBus::channel();
        let mut outbox = bus.outbox();
        SuggestionInvalidationService::publish(
            &mut outbox,
            Uuid::new_v4(),
            InvalidationReason::PlanEdited,
            "",
        );
        assert_eq!(outbox.staged_len(), 0);
    }
}
