//! Periodic refresh driver.
//!
//! The first cycle starts as soon as the scheduler starts, then one cycle per
//! interval. Each cycle runs in its own task so a slow cycle never delays the
//! next tick; with single flight enabled a tick that finds a cycle still
//! running is skipped.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use super::RefreshOrchestrator;
use crate::config::RefreshConfig;
use crate::errors::{AppError, AppResult};
use crate::models::EpgSource;

struct RunningSchedule {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct SchedulerService {
    orchestrator: Arc<RefreshOrchestrator>,
    interval: Duration,
    single_flight: bool,
    running: Mutex<Option<RunningSchedule>>,
}

impl SchedulerService {
    pub fn new(orchestrator: Arc<RefreshOrchestrator>, config: &RefreshConfig) -> Self {
        Self::with_interval(orchestrator, config.interval, config.single_flight)
    }

    pub fn with_interval(
        orchestrator: Arc<RefreshOrchestrator>,
        interval: Duration,
        single_flight: bool,
    ) -> Self {
        Self {
            orchestrator,
            interval,
            single_flight,
            running: Mutex::new(None),
        }
    }

    pub fn orchestrator(&self) -> &Arc<RefreshOrchestrator> {
        &self.orchestrator
    }

    /// Start the refresh loop. Must be called from within a Tokio runtime.
    pub fn start(&self, sources: Vec<EpgSource>) -> AppResult<()> {
        if self.interval.is_zero() {
            return Err(AppError::configuration(
                "refresh interval must be greater than zero",
            ));
        }

        let mut running = self.lock_running();
        if let Some(schedule) = running.as_ref()
            && !schedule.handle.is_finished()
        {
            return Err(AppError::operation_in_progress(
                "scheduler start",
                "EPG refresh loop",
            ));
        }

        info!(
            "Starting EPG scheduler: {} sources every {}",
            sources.len(),
            humantime::format_duration(self.interval)
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.orchestrator),
            Arc::from(sources),
            self.interval,
            self.single_flight,
            cancel.clone(),
        ));
        *running = Some(RunningSchedule { cancel, handle });
        Ok(())
    }

    /// Cancel future ticks. A cycle already running completes and publishes.
    ///
    /// Returns `false` when the scheduler was not running.
    pub fn stop(&self) -> bool {
        match self.lock_running().take() {
            Some(schedule) => {
                schedule.cancel.cancel();
                info!("Stopping EPG scheduler");
                true
            }
            None => false,
        }
    }

    /// Stop and wait for the loop task to exit
    pub async fn shutdown(&self) {
        let Some(schedule) = self.lock_running().take() else {
            return;
        };
        schedule.cancel.cancel();
        if let Err(e) = schedule.handle.await {
            error!("EPG scheduler task ended abnormally: {}", e);
        }
        info!("EPG scheduler shut down");
    }

    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|schedule| !schedule.handle.is_finished())
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<RunningSchedule>> {
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for SchedulerService {
    fn drop(&mut self) {
        if let Some(schedule) = self.lock_running().take() {
            schedule.cancel.cancel();
        }
    }
}

async fn run_loop(
    orchestrator: Arc<RefreshOrchestrator>,
    sources: Arc<[EpgSource]>,
    interval: Duration,
    single_flight: bool,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("EPG scheduler loop cancelled");
                break;
            }

            _ = ticker.tick() => {
                trace!("EPG scheduler tick");
                let orchestrator = Arc::clone(&orchestrator);
                let sources = Arc::clone(&sources);
                tokio::spawn(async move {
                    if single_flight {
                        orchestrator.try_refresh(&sources).await;
                    } else {
                        orchestrator.refresh_concurrent(&sources).await;
                    }
                });
            }
        }
    }
}
