//! Cron-driven sweep scheduler.
//!
//! A process-wide ticker fires the registered sweeps on their cron
//! schedules. Every sweep runs to completion and is not user-cancellable;
//! an explicit per-sweep overlap guard skips a tick (with a warning) when
//! the previous run is still in flight, rather than queueing or stacking
//! runs. A single scheduler instance is assumed — horizontal scaling needs
//! an external leader lock.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;
use tracing::{error, info, warn};

use cadence_core::defaults::SCHEDULER_POLL_INTERVAL_SECS;
use cadence_core::{Error, Result};

/// A periodic maintenance job.
#[async_trait]
pub trait Sweep: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Run one complete pass. Item-level failures are the sweep's own
    /// business (caught, logged, skipped); an `Err` here means the pass as
    /// a whole could not run.
    async fn run(&self, now: DateTime<Utc>) -> Result<()>;
}

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tick interval in seconds.
    pub poll_interval_secs: u64,
    /// Whether scheduling is enabled.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: SCHEDULER_POLL_INTERVAL_SECS,
            enabled: true,
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `SWEEP_SCHEDULER_ENABLED` | `true` | Enable/disable the scheduler |
    /// | `SWEEP_POLL_INTERVAL_SECS` | `60` | Tick interval |
    pub fn from_env() -> Self {
        let enabled = std::env::var("SWEEP_SCHEDULER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let poll_interval_secs = std::env::var("SWEEP_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(SCHEDULER_POLL_INTERVAL_SECS)
            .max(1);

        Self {
            poll_interval_secs,
            enabled,
        }
    }

    /// Set the tick interval.
    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Enable or disable scheduling.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// One registered sweep with its schedule and overlap guard.
struct ScheduledSweep {
    schedule: Schedule,
    sweep: Arc<dyn Sweep>,
    next_due: Option<DateTime<Utc>>,
    guard: Arc<Mutex<()>>,
}

/// Handle for controlling a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Signal the scheduler to shut down gracefully. Sweeps already in
    /// flight run to completion.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }
}

/// Process-wide scheduler over cron-style sweep schedules.
pub struct SweepScheduler {
    config: SchedulerConfig,
    sweeps: Vec<ScheduledSweep>,
}

impl SweepScheduler {
    /// Create an empty scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            sweeps: Vec::new(),
        }
    }

    /// Register a sweep under a 6-field cron expression (with seconds).
    pub fn register(&mut self, cron_expr: &str, sweep: Arc<dyn Sweep>) -> Result<()> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            Error::Schedule(format!("invalid cron expression '{cron_expr}': {e}"))
        })?;
        let next_due = schedule.upcoming(Utc).next();
        info!(
            sweep = sweep.name(),
            cron = cron_expr,
            next_due = ?next_due,
            "sweep registered"
        );
        self.sweeps.push(ScheduledSweep {
            schedule,
            sweep,
            next_due,
            guard: Arc::new(Mutex::new(())),
        });
        Ok(())
    }

    /// Number of registered sweeps.
    pub fn sweep_count(&self) -> usize {
        self.sweeps.len()
    }

    /// Start the scheduler and return a handle for control.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });
        SchedulerHandle { shutdown_tx }
    }

    async fn run(mut self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("sweep scheduler is disabled, not starting");
            return;
        }
        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            sweeps = self.sweeps.len(),
            "sweep scheduler started"
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("sweep scheduler received shutdown signal");
                    break;
                }
                _ = sleep(poll_interval) => {}
            }

            let now = Utc::now();
            for entry in &mut self.sweeps {
                let due = match entry.next_due {
                    Some(due) if now >= due => due,
                    _ => continue,
                };
                entry.next_due = entry.schedule.after(&now).next();

                // Overlap guard: a still-running previous pass keeps the
                // lock, and this tick is skipped rather than queued.
                let permit = match entry.guard.clone().try_lock_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!(
                            sweep = entry.sweep.name(),
                            missed_tick = %due,
                            "previous run still in progress; tick skipped"
                        );
                        continue;
                    }
                };

                let sweep = entry.sweep.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let name = sweep.name();
                    info!(sweep = name, "sweep run started");
                    match sweep.run(now).await {
                        Ok(()) => info!(sweep = name, "sweep run complete"),
                        Err(e) => error!(sweep = name, error = %e, "sweep run failed"),
                    }
                });
            }
        }
        info!("sweep scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSweep {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Sweep for CountingSweep {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self, _now: DateTime<Utc>) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_config_defaults_and_builders() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval_secs, SCHEDULER_POLL_INTERVAL_SECS);
        assert!(config.enabled);

        let config = SchedulerConfig::default()
            .with_poll_interval(5)
            .with_enabled(false);
        assert_eq!(config.poll_interval_secs, 5);
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_register_accepts_the_shipped_schedules() {
        let mut scheduler = SweepScheduler::new(SchedulerConfig::default());
        let runs = Arc::new(AtomicUsize::new(0));
        scheduler
            .register(
                cadence_core::defaults::MAINTENANCE_CRON,
                Arc::new(CountingSweep { runs: runs.clone() }),
            )
            .unwrap();
        scheduler
            .register(
                cadence_core::defaults::ACCOUNT_PURGE_CRON,
                Arc::new(CountingSweep { runs }),
            )
            .unwrap();
        assert_eq!(scheduler.sweep_count(), 2);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_cron() {
        let mut scheduler = SweepScheduler::new(SchedulerConfig::default());
        let runs = Arc::new(AtomicUsize::new(0));
        let err = scheduler
            .register("not a cron", Arc::new(CountingSweep { runs }))
            .unwrap_err();
        assert!(matches!(err, Error::Schedule(_)));
    }

    #[tokio::test]
    async fn test_due_sweep_fires_on_tick() {
        // An every-second schedule with a short poll interval fires within
        // a couple of ticks.
        let mut scheduler =
            SweepScheduler::new(SchedulerConfig::default().with_poll_interval(1));
        let runs = Arc::new(AtomicUsize::new(0));
        scheduler
            .register("* * * * * *", Arc::new(CountingSweep { runs: runs.clone() }))
            .unwrap();

        let handle = scheduler.start();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.shutdown().await.unwrap();

        assert!(runs.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_never_fires() {
        let mut scheduler = SweepScheduler::new(
            SchedulerConfig::default()
                .with_poll_interval(1)
                .with_enabled(false),
        );
        let runs = Arc::new(AtomicUsize::new(0));
        scheduler
            .register("* * * * * *", Arc::new(CountingSweep { runs: runs.clone() }))
            .unwrap();

        let _handle = scheduler.start();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
