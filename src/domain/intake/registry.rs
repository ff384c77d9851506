use std::sync::Arc;

use super::command_handler::EventCommandHandler;
use super::commands::Command;
use super::envelope::{CommandEnvelope, Resolved};
use super::errors::IntakeError;
use super::topic::Topic;

/// How an envelope was routed when no fault occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Handled(Topic),
    /// No handler is registered for the tag; not an error.
    UnknownTopic(String),
}

pub struct CommandRegistry {
    handler: Arc<dyn EventCommandHandler>,
}

impl CommandRegistry {
    pub fn new(handler: Arc<dyn EventCommandHandler>) -> Self {
        Self { handler }
    }

    pub async fn route(&self, envelope: CommandEnvelope) -> Result<RouteOutcome, IntakeError> {
        match envelope.resolve()? {
            Resolved::UnknownTopic(tag) => Ok(RouteOutcome::UnknownTopic(tag)),
            Resolved::Command(command) => {
                let topic = command.topic();
                self.dispatch(command).await?;
                Ok(RouteOutcome::Handled(topic))
            }
        }
    }

    /// Invoke the handler for `command`, converting a falsy result into an error.
    pub async fn dispatch(&self, command: Command) -> Result<(), IntakeError> {
        match command {
            Command::UpdateEvent(cmd) => {
                if !self.handler.update_event(&cmd).await? {
                    return Err(IntakeError::Rejected("Failed to update event data"));
                }
                tracing::info!(link_id = cmd.link_id, "Successfully updated event");
            }
            Command::IntakeEventsByLocation(cmd) => {
                let written = self.handler.intake_events_by_location(&cmd).await?;
                if written == 0 {
                    return Err(IntakeError::Rejected("Failed to intake tournament batch"));
                }
                tracing::info!(
                    state_code = %cmd.state_code,
                    written = written,
                    "Successfully ingested events by location"
                );
            }
        }
        Ok(())
    }
}
