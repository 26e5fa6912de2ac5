//! Post-commit change listener.
//!
//! The single consumer of the change bus. Events arrive at-least-once and
//! only after their originating transaction committed; each one is routed
//! to the lifecycle manager or the invalidation service. A handler failure
//! is logged and the event skipped — the loop never dies on one bad item,
//! and the handlers it calls are idempotent, so a redelivered event is
//! harmless.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info};

use cadence_core::{ChangeEvent, Error, Result};

use crate::invalidation::SuggestionInvalidationService;
use crate::lifecycle::ReminderLifecycleManager;

/// Handle for controlling a running listener.
pub struct ListenerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ListenerHandle {
    /// Signal the listener to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }
}

/// Consumer task dispatching change events to their handlers.
pub struct ChangeListener {
    lifecycle: Arc<ReminderLifecycleManager>,
    invalidation: Arc<SuggestionInvalidationService>,
}

impl ChangeListener {
    pub fn new(
        lifecycle: Arc<ReminderLifecycleManager>,
        invalidation: Arc<SuggestionInvalidationService>,
    ) -> Self {
        Self {
            lifecycle,
            invalidation,
        }
    }

    /// Start the listener and return a handle for control.
    pub fn spawn(self, rx: mpsc::UnboundedReceiver<ChangeEvent>) -> ListenerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        tokio::spawn(async move {
            self.run(rx, shutdown_rx).await;
        });
        ListenerHandle { shutdown_tx }
    }

    async fn run(
        self,
        mut rx: mpsc::UnboundedReceiver<ChangeEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        info!("change listener started");
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("change listener received shutdown signal");
                    break;
                }
                event = rx.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        info!("change bus closed; listener stopping");
                        break;
                    }
                },
            }
        }
        info!("change listener stopped");
    }

    /// Route one event, containing any handler failure to this item.
    pub async fn dispatch(&self, event: ChangeEvent) {
        let event_type = event.event_type();
        let member_id = event.member_id();
        if let Err(e) = self.handle(event).await {
            error!(
                event_type,
                member_id = %member_id,
                error = %e,
                "change handler failed; event skipped"
            );
        }
    }

    async fn handle(&self, event: ChangeEvent) -> Result<()> {
        let now = Utc::now();
        match event {
            ChangeEvent::PlanChanged {
                event_id,
                member_id,
                title,
                occurrence_time,
                target_type,
            } => {
                self.lifecycle
                    .on_plan_changed(
                        event_id,
                        member_id,
                        &title,
                        occurrence_time,
                        target_type,
                        now,
                    )
                    .await
            }
            ChangeEvent::RecurrenceExceptionChanged {
                event_id,
                target_type,
                occurrence_time,
                change_type,
                ..
            } => {
                self.lifecycle
                    .on_instances_removed(event_id, target_type, occurrence_time, change_type)
                    .await
                    .map(|_| ())
            }
            ChangeEvent::ReminderDeleted {
                target_id,
                target_type,
                occurrence_time,
                deleted_type,
                ..
            } => {
                self.lifecycle
                    .on_instances_removed(target_id, target_type, occurrence_time, deleted_type)
                    .await
                    .map(|_| ())
            }
            ChangeEvent::SuggestionInvalidate {
                member_id,
                target_key_hash,
                ..
            } => {
                self.invalidation
                    .invalidate(member_id, &target_key_hash)
                    .await
                    .map(|_| ())
            }
        }
    }
}
