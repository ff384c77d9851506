use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use super::dispatch::{CommandDispatcher, DispatchError, DispatchOutcome};
use super::transport::MessageSource;
use crate::metrics::Metrics;

// ============================================================================
// Intake Dispatch Worker
// ============================================================================
//
// One consumption loop, set up once and run until cancelled:
//
//   Idle → Listening ──receive──▶ spawn(process) ──▶ Listening
//                 │
//            cancelled
//                 ▼
//              Draining (in-flight messages finish) → Stopped
//
// A semaphore bounds how many messages are being processed at once; the
// permit is acquired before receiving so excess messages stay on the broker.
// Faults re-raised by processing are reported through `report_fault`.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Listening,
    Draining,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub max_concurrent_calls: usize,
    /// Pause after a transport error before receiving again.
    pub error_backoff: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 5,
            error_backoff: Duration::from_secs(1),
        }
    }
}

/// Tally of settled messages, returned when the worker stops.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub completed: usize,
    pub ignored: usize,
    pub dropped: usize,
    pub faults: usize,
}

type Processed = Result<DispatchOutcome, DispatchError>;

pub struct IntakeDispatchWorker<S> {
    source: S,
    dispatcher: Arc<CommandDispatcher>,
    metrics: Arc<Metrics>,
    options: WorkerOptions,
    state: watch::Sender<WorkerState>,
}

impl<S> IntakeDispatchWorker<S>
where
    S: MessageSource + 'static,
{
    pub fn new(source: S, dispatcher: CommandDispatcher, metrics: Arc<Metrics>, options: WorkerOptions) -> Self {
        let (state, _) = watch::channel(WorkerState::Idle);
        Self {
            source,
            dispatcher: Arc::new(dispatcher),
            metrics,
            options,
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    pub async fn run(&self, shutdown: CancellationToken) -> WorkerReport {
        let permits = Arc::new(Semaphore::new(self.options.max_concurrent_calls.max(1)));
        let mut in_flight: JoinSet<Processed> = JoinSet::new();
        let mut report = WorkerReport::default();

        self.state.send_replace(WorkerState::Listening);
        tracing::info!(
            max_concurrent_calls = self.options.max_concurrent_calls,
            "Intake worker listening"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            while let Some(joined) = in_flight.try_join_next() {
                self.settle(joined, &mut report);
            }

            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = self.source.receive() => received,
            };

            match received {
                Ok(message) => {
                    let dispatcher = self.dispatcher.clone();
                    in_flight.spawn(async move {
                        let _permit = permit;
                        dispatcher.process(message).await
                    });
                }
                Err(e) => {
                    drop(permit);
                    tracing::error!(error = %e, "Failed to receive from intake queue");
                    self.metrics.transport_errors.inc();

                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.options.error_backoff) => {}
                    }
                }
            }
        }

        self.state.send_replace(WorkerState::Draining);
        tracing::info!(in_flight = in_flight.len(), "Intake worker draining");

        while let Some(joined) = in_flight.join_next().await {
            self.settle(joined, &mut report);
        }

        self.state.send_replace(WorkerState::Stopped);
        tracing::info!(?report, "Intake worker stopped");
        report
    }

    fn settle(&self, joined: Result<Processed, JoinError>, report: &mut WorkerReport) {
        match joined {
            Ok(Ok(DispatchOutcome::Completed(_))) => report.completed += 1,
            Ok(Ok(DispatchOutcome::IgnoredUnknownTopic(_))) => report.ignored += 1,
            Ok(Ok(DispatchOutcome::DroppedUndecodable)) => report.dropped += 1,
            Ok(Err(fault)) => self.report_fault(&fault, report),
            Err(e) => {
                tracing::error!(error = %e, "Message processing task panicked");
                self.metrics.handler_faults.inc();
                report.faults += 1;
            }
        }
    }

    fn report_fault(&self, fault: &DispatchError, report: &mut WorkerReport) {
        tracing::error!(error = %fault, "Message processing raised a fault");
        self.metrics.handler_faults.inc();
        report.faults += 1;
    }
}
