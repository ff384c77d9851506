pub mod kafka;
pub mod offsets;

pub use kafka::{dead_letter_topic, KafkaCommandSource, DEAD_LETTER_REASON_HEADER};
pub use offsets::OffsetTracker;
