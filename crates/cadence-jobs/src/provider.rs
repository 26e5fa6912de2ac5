//! Occurrence dispatch to the owning domain.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::trace;
use uuid::Uuid;

use cadence_core::{
    NextOccurrenceResult, Occurrence, OccurrenceSource, Reminder, Result, TargetType,
};

/// Routes "what is the next occurrence of this target" to the domain that
/// owns the target, hiding from the lifecycle manager which kind of item
/// backs a reminder.
pub struct OccurrenceProvider {
    events: Arc<dyn OccurrenceSource>,
    todos: Arc<dyn OccurrenceSource>,
}

impl OccurrenceProvider {
    /// Create a provider over the two domain capabilities.
    pub fn new(events: Arc<dyn OccurrenceSource>, todos: Arc<dyn OccurrenceSource>) -> Self {
        Self { events, todos }
    }

    /// Next occurrence of the target strictly after `after`.
    ///
    /// A missing target or a one-off with no future instance answers
    /// [`NextOccurrenceResult::none`]; whether that terminates the reminder
    /// is the caller's decision.
    pub async fn get_next_occurrence(
        &self,
        target_type: TargetType,
        target_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<NextOccurrenceResult> {
        let source = match target_type {
            TargetType::Event => &self.events,
            TargetType::Todo => &self.todos,
        };
        let result = source.calculate_next_occurrence(target_id, after).await?;
        trace!(
            target_id = %target_id,
            target_type = %target_type,
            has_next = result.has_next,
            "next occurrence resolved"
        );
        Ok(result)
    }

    /// Next occurrence of a reminder's target as a full [`Occurrence`]
    /// value, for callers that need the target context with the instant.
    ///
    /// The title falls back to the reminder's own when the owning domain
    /// does not report one.
    pub async fn next_occurrence_of(
        &self,
        reminder: &Reminder,
        after: DateTime<Utc>,
    ) -> Result<Option<Occurrence>> {
        let next = self
            .get_next_occurrence(reminder.target_type, reminder.target_id, after)
            .await?;
        Ok(match (next.has_next, next.next_time) {
            (true, Some(occurrence_time)) => Some(Occurrence {
                target_id: reminder.target_id,
                target_type: reminder.target_type,
                occurrence_time,
                title: next.next_title.unwrap_or_else(|| reminder.title.clone()),
                is_recurring: next.is_recurring,
            }),
            _ => None,
        })
    }
}
