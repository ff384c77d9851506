//! Scriptable `EventCommandHandler` for registry and worker tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::command_handler::EventCommandHandler;
use super::commands::{IntakeEventsByLocationCommand, UpdateEventCommand};

pub struct StubHandler {
    update_result: bool,
    intake_count: usize,
    failure: Option<String>,
    update_calls: AtomicUsize,
    intake_calls: AtomicUsize,
}

impl StubHandler {
    pub fn succeeding() -> Self {
        Self {
            update_result: true,
            intake_count: 3,
            failure: None,
            update_calls: AtomicUsize::new(0),
            intake_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn with_update_result(mut self, result: bool) -> Self {
        self.update_result = result;
        self
    }

    pub fn with_intake_count(mut self, count: usize) -> Self {
        self.intake_count = count;
        self
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn intake_calls(&self) -> usize {
        self.intake_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventCommandHandler for StubHandler {
    async fn update_event(&self, _command: &UpdateEventCommand) -> anyhow::Result<bool> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.update_result),
        }
    }

    async fn intake_events_by_location(&self, _command: &IntakeEventsByLocationCommand) -> anyhow::Result<usize> {
        self.intake_calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.intake_count),
        }
    }
}
