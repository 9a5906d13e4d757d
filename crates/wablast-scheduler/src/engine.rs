//! Timer registry and reconcile loop.
//!
//! Each scheduled job owns one spawned task that repeatedly computes its
//! next fire time, sleeps until then, and dispatches. The registry is
//! keyed by job id, so scheduling the same job twice is a no-op and a
//! job's fires are sequential while distinct jobs interleave freely.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::dispatch::{DeliveryMode, Dispatcher};
use crate::store::JobStore;
use crate::types::{Job, JobTrigger, Target};

/// Stop signal for one armed timer. Cancellation is cooperative: the
/// signal interrupts the sleep between fires, never a fire itself, so
/// an in-flight delivery always completes and records its history.
struct TimerHandle {
    stop: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct Scheduler {
    store: JobStore,
    dispatcher: Dispatcher,
    tz: Tz,
    reconcile_interval: Duration,
    timers: Arc<DashMap<i64, TimerHandle>>,
}

impl Scheduler {
    pub fn new(
        store: JobStore,
        dispatcher: Dispatcher,
        tz: Tz,
        reconcile_interval: Duration,
    ) -> Self {
        Scheduler {
            store,
            dispatcher,
            tz,
            reconcile_interval,
            timers: Arc::new(DashMap::new()),
        }
    }

    pub fn scheduled_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, id: i64) -> bool {
        self.timers.contains_key(&id)
    }

    /// Arm a timer for `job`. A job that is already scheduled is left
    /// untouched; a job with an invalid expression is logged and skipped.
    pub fn schedule(&self, job: Job) {
        if let Err(e) = wablast_cron::validate(&job.cron_expression) {
            warn!(job_id = job.id, name = %job.name, error = %e, "invalid cron expression, job not scheduled");
            return;
        }

        use dashmap::mapref::entry::Entry;
        match self.timers.entry(job.id) {
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                info!(job_id = job.id, name = %job.name, cron = %job.cron_expression, "job scheduled");
                let (stop_tx, stop_rx) = watch::channel(false);
                let worker = self.clone();
                tokio::spawn(async move {
                    worker.run_timer(job, stop_rx).await;
                });
                slot.insert(TimerHandle { stop: stop_tx });
            }
        }
    }

    /// Tear down a job's timer. Returns false when no timer existed.
    /// A sleeping timer exits immediately; one mid-delivery finishes
    /// the fire (history row included) before exiting.
    pub fn cancel(&self, id: i64) -> bool {
        match self.timers.remove(&id) {
            Some((_, handle)) => {
                let _ = handle.stop.send(true);
                info!(job_id = id, "job unscheduled");
                true
            }
            None => false,
        }
    }

    /// Re-arm a job after its definition changed.
    pub fn reschedule(&self, job: Job) {
        self.cancel(job.id);
        self.schedule(job);
    }

    /// Arm timers for every eligible job that is not already scheduled.
    /// Never cancels: jobs that became ineligible are torn down by the
    /// mutation path, not by reconciliation.
    pub fn reconcile(&self) {
        for job in self.store.eligible_jobs() {
            if !self.timers.contains_key(&job.id) {
                self.schedule(job);
            }
        }
    }

    /// Reconcile immediately, then on every interval tick until shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.reconcile_interval.as_secs(),
            timezone = %self.tz,
            "scheduler started"
        );
        let mut ticker = tokio::time::interval(self.reconcile_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.reconcile(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scheduler shutting down");
                        self.cancel_all();
                        break;
                    }
                }
            }
        }
    }

    fn cancel_all(&self) {
        let ids: Vec<i64> = self.timers.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.cancel(id);
        }
    }

    async fn run_timer(self, job: Job, mut stop: watch::Receiver<bool>) {
        loop {
            if *stop.borrow() {
                return;
            }
            let next = match wablast_cron::next_runs(&job.cron_expression, self.tz, 1) {
                Ok(runs) => runs.into_iter().next(),
                Err(_) => None,
            };
            let Some(next) = next else {
                warn!(job_id = job.id, name = %job.name, "no upcoming fire time, timer stopped");
                self.timers.remove(&job.id);
                return;
            };

            let delay = (next - Utc::now()).to_std().unwrap_or_default();
            // Only the sleep races the stop signal; a fire that has
            // started is never interrupted.
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return;
                    }
                    continue;
                }
            }
            self.fire(&job).await;
        }
    }

    /// Dispatch one fire and record it. Exactly one history row is written
    /// per fire; unknown triggers are skipped without a row.
    pub(crate) async fn fire(&self, job: &Job) {
        let trigger = match job.trigger.parse::<JobTrigger>() {
            Ok(trigger) => trigger,
            Err(e) => {
                warn!(job_id = job.id, name = %job.name, error = %e, "skipping fire");
                return;
            }
        };
        let mode = match trigger {
            JobTrigger::SendMessage => DeliveryMode::Direct,
            JobTrigger::SendGroupMessage => DeliveryMode::Group,
        };
        let target = Target::parse(&job.target);

        let execute_time = Utc::now().to_rfc3339();
        info!(job_id = job.id, name = %job.name, %trigger, "executing job");

        let result = self
            .dispatcher
            .send(mode, &target.delivery_id, &job.message)
            .await;
        let complete_time = Utc::now().to_rfc3339();

        match result {
            Ok(_) => {
                self.store
                    .append_history(&job.name, &execute_time, &complete_time, None);
            }
            Err(e) => {
                error!(job_id = job.id, name = %job.name, error = %e, "job dispatch failed");
                self.store.append_history(
                    &job.name,
                    &execute_time,
                    &complete_time,
                    Some(&e.to_string()),
                );
            }
        }
    }
}
