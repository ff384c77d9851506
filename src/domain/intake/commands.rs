use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::topic::Topic;
use crate::models::{Address, Event, RegionId};

// ============================================================================
// Intake Commands - one payload shape per topic
// ============================================================================
//
// Payloads reject unknown fields so a body meant for one topic never
// deserializes as another topic's command.
//
// ============================================================================

/// Partial update of an already-ingested event, matched by `link_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct UpdateEventCommand {
    pub link_id: i32,
    pub event_name: Option<String>,
    pub event_description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A batch of tournaments discovered for one state/location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct IntakeEventsByLocationCommand {
    pub state_code: String,
    pub events: Vec<IntakeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct IntakeEvent {
    pub link_id: i32,
    pub event_name: String,
    #[serde(default)]
    pub event_description: String,
    pub region: RegionId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl IntakeEvent {
    pub fn to_parts(&self) -> (Event, Address) {
        (
            Event {
                name: self.event_name.clone(),
                description: self.event_description.clone(),
                region: self.region,
                start_time: self.start_time,
                end_time: self.end_time,
                link_id: self.link_id,
            },
            Address {
                address: self.address.clone(),
                latitude: self.latitude,
                longitude: self.longitude,
            },
        )
    }
}

/// Typed command, keyed by the topic it arrived on.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    UpdateEvent(UpdateEventCommand),
    IntakeEventsByLocation(IntakeEventsByLocationCommand),
}

impl Command {
    pub fn topic(&self) -> Topic {
        match self {
            Command::UpdateEvent(_) => Topic::UpdateEvent,
            Command::IntakeEventsByLocation(_) => Topic::IntakeEventsByLocation,
        }
    }
}
