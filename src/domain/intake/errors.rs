use super::topic::Topic;

// ============================================================================
// Intake Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Message body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Message body is not a command envelope")]
    NotAnEnvelope,

    #[error("Command is not of the type expected by topic {topic}: {source}")]
    TypeMismatch {
        topic: Topic,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Rejected(&'static str),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl IntakeError {
    /// Decode failures drop the message; everything else is a handler fault.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, IntakeError::Decode(_) | IntakeError::NotAnEnvelope)
    }
}

// ============================================================================
// Intake Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("State code cannot be empty")]
    EmptyStateCode,

    #[error("Event link id cannot be zero")]
    MissingLinkId,

    #[error("Event {0} has no region")]
    MissingRegion(i32),

    #[error("Event {0} has an empty name")]
    EmptyName(i32),

    #[error("Event {0} ends before it starts")]
    EndsBeforeStart(i32),

    #[error("Event {link_id} has latitude out of range: {value}")]
    LatitudeOutOfRange { link_id: i32, value: f64 },

    #[error("Event {link_id} has longitude out of range: {value}")]
    LongitudeOutOfRange { link_id: i32, value: f64 },

    #[error("Event {0} appears more than once in the batch")]
    DuplicateLinkId(i32),
}
