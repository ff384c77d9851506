use std::sync::Arc;
use std::time::Instant;

use super::transport::InboundMessage;
use crate::domain::intake::{CommandEnvelope, CommandRegistry, IntakeError, RouteOutcome, Topic};
use crate::metrics::Metrics;

// ============================================================================
// Message Dispatch - decode → route → ack / dead-letter
// ============================================================================
//
// Every path ends in exactly one named result:
// - Completed           handler succeeded, message acknowledged
// - IgnoredUnknownTopic no handler registered, message acknowledged
// - DroppedUndecodable  body unreadable, neither acked nor dead-lettered,
//                       only released back to the transport
// - Err(HandlerFault)   message dead-lettered, fault re-raised to caller
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed(Topic),
    IgnoredUnknownTopic(String),
    DroppedUndecodable,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Message {message_id} dead-lettered after handler fault: {source}")]
    HandlerFault {
        message_id: String,
        #[source]
        source: IntakeError,
    },

    #[error("Message {message_id} could not be dead-lettered after handler fault ({fault}): {cause:#}")]
    DeadLetterFailed {
        message_id: String,
        fault: IntakeError,
        cause: anyhow::Error,
    },

    #[error("Message {message_id} could not be acknowledged: {cause:#}")]
    AckFailed {
        message_id: String,
        cause: anyhow::Error,
    },
}

pub struct CommandDispatcher {
    registry: CommandRegistry,
    metrics: Arc<Metrics>,
}

impl CommandDispatcher {
    pub fn new(registry: CommandRegistry, metrics: Arc<Metrics>) -> Self {
        Self { registry, metrics }
    }

    pub async fn process(&self, message: InboundMessage) -> Result<DispatchOutcome, DispatchError> {
        let InboundMessage { id, body, delivery } = message;
        self.metrics.messages_received.inc();

        tracing::debug!(message_id = %id, bytes = body.len(), "Received message");

        let envelope = match CommandEnvelope::decode(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(message_id = %id, error = %e, "Dropping undecodable message");
                self.metrics.messages_dropped.inc();
                if let Err(cause) = delivery.release().await {
                    tracing::warn!(message_id = %id, error = %cause, "Failed to release dropped message");
                }
                return Ok(DispatchOutcome::DroppedUndecodable);
            }
        };

        let label = envelope.topic.label().to_string();
        let started = Instant::now();

        match self.registry.route(envelope).await {
            Ok(RouteOutcome::Handled(topic)) => {
                delivery
                    .complete()
                    .await
                    .map_err(|cause| DispatchError::AckFailed { message_id: id.clone(), cause })?;

                self.metrics.record_completed(&label, started.elapsed().as_secs_f64());
                tracing::info!(message_id = %id, topic = %topic, "Message completed");
                Ok(DispatchOutcome::Completed(topic))
            }
            Ok(RouteOutcome::UnknownTopic(tag)) => {
                delivery
                    .complete()
                    .await
                    .map_err(|cause| DispatchError::AckFailed { message_id: id.clone(), cause })?;

                self.metrics.messages_ignored.inc();
                tracing::warn!(message_id = %id, tag = %tag, "No handler for topic, acknowledged");
                Ok(DispatchOutcome::IgnoredUnknownTopic(tag))
            }
            Err(fault) => {
                tracing::error!(
                    message_id = %id,
                    topic = %label,
                    error = %fault,
                    "Handler fault, dead-lettering message"
                );

                if let Err(cause) = delivery.dead_letter(&fault.to_string()).await {
                    return Err(DispatchError::DeadLetterFailed { message_id: id, fault, cause });
                }

                self.metrics.record_dead_letter(&label, started.elapsed().as_secs_f64());
                Err(DispatchError::HandlerFault { message_id: id, source: fault })
            }
        }
    }
}
