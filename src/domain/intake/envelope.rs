use serde_json::{Map, Value};

use super::commands::{Command, IntakeEventsByLocationCommand, UpdateEventCommand};
use super::errors::IntakeError;
use super::topic::{Topic, TopicTag};

// ============================================================================
// Command Envelope
// ============================================================================
//
// Wire format: {"Topic": <name or ordinal>, "Command": {...}}
//
// Decoding happens in two stages so the failure modes stay distinct:
// 1. decode()  - body → envelope. Failure = undecodable message (dropped).
// 2. resolve() - envelope → typed Command for its topic. Failure = type
//                mismatch (a handler fault, dead-lettered).
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CommandEnvelope {
    pub topic: TopicTag,
    pub command: Value,
}

/// Result of resolving an envelope against the registered topics.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Command(Command),
    UnknownTopic(String),
}

impl CommandEnvelope {
    /// Parse a raw message body. Field names match case-insensitively.
    pub fn decode(raw: &[u8]) -> Result<Self, IntakeError> {
        let value: Value = serde_json::from_slice(raw).map_err(IntakeError::Decode)?;

        let Value::Object(mut fields) = value else {
            return Err(IntakeError::NotAnEnvelope);
        };

        let topic = take_field(&mut fields, "Topic");
        let command = take_field(&mut fields, "Command").unwrap_or(Value::Null);

        Ok(Self {
            topic: TopicTag::from_value(topic.as_ref()),
            command,
        })
    }

    /// Deserialize the payload into the command shape registered for the
    /// envelope's topic.
    pub fn resolve(self) -> Result<Resolved, IntakeError> {
        let topic = match self.topic {
            TopicTag::Known(topic) => topic,
            TopicTag::Unknown(tag) => return Ok(Resolved::UnknownTopic(tag)),
        };

        let mismatch = |source| IntakeError::TypeMismatch { topic, source };

        let command = match topic {
            Topic::UpdateEvent => Command::UpdateEvent(
                serde_json::from_value::<UpdateEventCommand>(self.command).map_err(mismatch)?,
            ),
            Topic::IntakeEventsByLocation => Command::IntakeEventsByLocation(
                serde_json::from_value::<IntakeEventsByLocationCommand>(self.command).map_err(mismatch)?,
            ),
        };

        Ok(Resolved::Command(command))
    }
}

fn take_field(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let key = fields.keys().find(|k| k.eq_ignore_ascii_case(name))?.clone();
    fields.remove(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_topic_by_name() {
        let envelope = CommandEnvelope::decode(br#"{"Topic": "UpdateEvent", "Command": {"LinkId": 3}}"#).unwrap();

        assert_eq!(envelope.topic, TopicTag::Known(Topic::UpdateEvent));
        assert_eq!(envelope.command["LinkId"], 3);
    }

    #[test]
    fn test_decode_is_case_insensitive_on_envelope_fields() {
        let envelope = CommandEnvelope::decode(br#"{"topic": 1, "command": {}}"#).unwrap();

        assert_eq!(envelope.topic, TopicTag::Known(Topic::IntakeEventsByLocation));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = CommandEnvelope::decode(b"{not json").unwrap_err();
        assert!(err.is_decode_failure());

        let err = CommandEnvelope::decode(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, IntakeError::NotAnEnvelope));
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_missing_topic_resolves_as_unknown() {
        let envelope = CommandEnvelope::decode(br#"{"Command": {"LinkId": 3}}"#).unwrap();

        assert_eq!(
            envelope.resolve().unwrap(),
            Resolved::UnknownTopic("<missing>".to_string())
        );
    }

    #[test]
    fn test_resolve_update_event() {
        let envelope = CommandEnvelope::decode(
            br#"{"Topic": "UpdateEvent", "Command": {"LinkId": 3, "EventName": "Finals"}}"#,
        )
        .unwrap();

        match envelope.resolve().unwrap() {
            Resolved::Command(Command::UpdateEvent(cmd)) => {
                assert_eq!(cmd.link_id, 3);
                assert_eq!(cmd.event_name.as_deref(), Some("Finals"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_update_payload_on_intake_topic_is_type_mismatch() {
        let envelope = CommandEnvelope::decode(
            br#"{"Topic": "IntakeEventsByLocation", "Command": {"LinkId": 3}}"#,
        )
        .unwrap();

        let err = envelope.resolve().unwrap_err();

        assert!(matches!(
            err,
            IntakeError::TypeMismatch { topic: Topic::IntakeEventsByLocation, .. }
        ));
        assert!(!err.is_decode_failure());
    }

    #[test]
    fn test_missing_command_on_known_topic_is_type_mismatch() {
        let envelope = CommandEnvelope::decode(br#"{"Topic": "UpdateEvent"}"#).unwrap();

        assert!(matches!(envelope.resolve(), Err(IntakeError::TypeMismatch { .. })));
    }
}
