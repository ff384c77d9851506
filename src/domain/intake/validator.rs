use std::collections::HashSet;

use super::commands::{IntakeEvent, IntakeEventsByLocationCommand};
use super::errors::ValidationError;

/// Gatekeeper for tournament batches before they reach the store.
#[derive(Debug, Clone, Default)]
pub struct IntakeValidator;

impl IntakeValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_command(&self, command: &IntakeEventsByLocationCommand) -> Result<(), ValidationError> {
        if command.state_code.trim().is_empty() {
            return Err(ValidationError::EmptyStateCode);
        }
        Ok(())
    }

    pub fn validate_event(&self, event: &IntakeEvent) -> Result<(), ValidationError> {
        let link_id = event.link_id;

        if link_id == 0 {
            return Err(ValidationError::MissingLinkId);
        }
        if event.region == 0 {
            return Err(ValidationError::MissingRegion(link_id));
        }
        if event.event_name.trim().is_empty() {
            return Err(ValidationError::EmptyName(link_id));
        }
        if event.end_time < event.start_time {
            return Err(ValidationError::EndsBeforeStart(link_id));
        }
        if !(-90.0..=90.0).contains(&event.latitude) {
            return Err(ValidationError::LatitudeOutOfRange { link_id, value: event.latitude });
        }
        if !(-180.0..=180.0).contains(&event.longitude) {
            return Err(ValidationError::LongitudeOutOfRange { link_id, value: event.longitude });
        }

        Ok(())
    }

    /// Events that pass validation, first occurrence wins on duplicate link
    /// ids. Rejections are logged and skipped.
    pub fn accepted_events<'a>(&self, events: &'a [IntakeEvent]) -> Vec<&'a IntakeEvent> {
        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(events.len());

        for event in events {
            let verdict = self.validate_event(event).and_then(|()| {
                if seen.insert(event.link_id) {
                    Ok(())
                } else {
                    Err(ValidationError::DuplicateLinkId(event.link_id))
                }
            });

            match verdict {
                Ok(()) => accepted.push(event),
                Err(reason) => {
                    tracing::warn!(link_id = event.link_id, reason = %reason, "Skipping invalid event");
                }
            }
        }

        accepted
    }
}
