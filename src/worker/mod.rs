// ============================================================================
// Worker - consumption of the received queue
// ============================================================================
//
// - transport     - MessageSource / Delivery seam to the broker
// - dispatch      - CommandDispatcher: one message → one settled outcome
// - intake_worker - IntakeDispatchWorker: bounded concurrent receive loop
//
// ============================================================================

pub mod dispatch;
pub mod intake_worker;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatch::{CommandDispatcher, DispatchError, DispatchOutcome};
pub use intake_worker::{IntakeDispatchWorker, WorkerOptions, WorkerReport, WorkerState};
pub use transport::{Delivery, InboundMessage, MessageSource};
