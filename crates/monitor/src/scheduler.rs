use std::sync::Arc;
use std::time::Duration;

use sqs_exporter_queues::QueueService;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

use crate::cycle::MonitoringCycle;
use crate::error::{Error, MonitoringError, Result};

/// Options for configuring a `Scheduler`.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerOptions {
    /// Time between the start of consecutive cycles.
    pub period: Duration,

    /// Upper bound on a single cycle.
    pub cycle_timeout: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
            cycle_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs monitoring cycles on a fixed period, one at a time.
pub struct Scheduler<S>
where
    S: QueueService,
{
    cycle: Arc<MonitoringCycle<S>>,
    options: SchedulerOptions,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl<S> Scheduler<S>
where
    S: QueueService,
{
    /// Creates a new `Scheduler`.
    pub fn new(cycle: MonitoringCycle<S>, options: SchedulerOptions) -> Self {
        Self {
            cycle: Arc::new(cycle),
            options,
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        }
    }

    /// Starts running cycles. The first cycle runs immediately.
    ///
    /// Every failed cycle is sent to `failures`; the scheduler keeps going
    /// until shut down or until `failures` is closed.
    pub fn start(&self, failures: mpsc::Sender<MonitoringError>) -> Result<JoinHandle<()>> {
        if self.task_tracker.is_closed() {
            return Err(Error::AlreadyStarted);
        }

        let cycle = self.cycle.clone();
        let SchedulerOptions {
            period,
            cycle_timeout,
        } = self.options;
        let shutdown_token = self.shutdown_token.clone();

        let handle = self.task_tracker.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = shutdown_token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let result = tokio::select! {
                    biased;
                    () = shutdown_token.cancelled() => break,
                    result = cycle.run_with_timeout(cycle_timeout) => result,
                };

                if let Err(e) = result {
                    tokio::select! {
                        biased;
                        () = shutdown_token.cancelled() => break,
                        sent = failures.send(e) => {
                            if sent.is_err() {
                                info!("failure receiver dropped, stopping scheduler");
                                break;
                            }
                        }
                    }
                }
            }

            info!("scheduler stopped");
        });

        self.task_tracker.close();

        Ok(handle)
    }

    /// Stops issuing cycles and waits for the scheduler task to exit.
    pub async fn shutdown(&self) {
        info!("scheduler shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;
    }
}
