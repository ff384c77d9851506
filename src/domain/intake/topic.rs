use serde_json::Value;
use std::fmt;

/// Queue topics with a registered command shape.
///
/// The ordinal of each variant is its numeric wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    UpdateEvent,
    IntakeEventsByLocation,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::UpdateEvent, Topic::IntakeEventsByLocation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::UpdateEvent => "UpdateEvent",
            Topic::IntakeEventsByLocation => "IntakeEventsByLocation",
        }
    }

    pub fn ordinal(&self) -> u64 {
        match self {
            Topic::UpdateEvent => 0,
            Topic::IntakeEventsByLocation => 1,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The topic tag as found on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicTag {
    Known(Topic),
    Unknown(String),
}

impl TopicTag {
    /// Interpret a raw tag: a variant name or its ordinal. Anything else,
    /// including a missing tag, is unknown.
    pub fn from_value(value: Option<&Value>) -> Self {
        let known = match value {
            Some(Value::String(name)) => Topic::ALL.into_iter().find(|t| t.as_str() == name.as_str()),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|ordinal| Topic::ALL.into_iter().find(|t| t.ordinal() == ordinal)),
            _ => None,
        };

        match (known, value) {
            (Some(topic), _) => TopicTag::Known(topic),
            (None, None) | (None, Some(Value::Null)) => TopicTag::Unknown("<missing>".to_string()),
            (None, Some(Value::String(name))) => TopicTag::Unknown(name.clone()),
            (None, Some(other)) => TopicTag::Unknown(other.to_string()),
        }
    }

    /// Metrics/log label.
    pub fn label(&self) -> &str {
        match self {
            TopicTag::Known(topic) => topic.as_str(),
            TopicTag::Unknown(_) => "unknown",
        }
    }
}
