use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::{Header, Message, OwnedHeaders},
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
    Offset, TopicPartitionList,
};

use super::offsets::OffsetTracker;
use crate::worker::{Delivery, InboundMessage, MessageSource};

// ============================================================================
// Kafka Transport
// ============================================================================
//
// Auto-commit is off. Every settlement goes through the OffsetTracker,
// which commits only once all lower offsets of the partition are settled:
// - complete     → settle
// - dead_letter  → produce the original payload to `<queue>.dlq` with an
//                  `x-dead-letter-reason` header, then settle
// - release      → settle without acking (undecodable messages), so the
//                  partition position can move past it
//
// ============================================================================

pub const DEAD_LETTER_REASON_HEADER: &str = "x-dead-letter-reason";

pub fn dead_letter_topic(queue: &str) -> String {
    format!("{queue}.dlq")
}

pub struct KafkaCommandSource {
    consumer: Arc<StreamConsumer>,
    producer: FutureProducer,
    offsets: Arc<OffsetTracker>,
    dead_letter_topic: String,
}

impl KafkaCommandSource {
    pub fn connect(brokers: &str, group_id: &str, queue: &str) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "10000")
            .create()
            .context("Failed to create Kafka consumer")?;

        consumer
            .subscribe(&[queue])
            .with_context(|| format!("Failed to subscribe to {queue}"))?;

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka dead-letter producer")?;

        tracing::info!(brokers, group_id, queue, "Subscribed to intake queue");

        Ok(Self {
            consumer: Arc::new(consumer),
            producer,
            offsets: Arc::new(OffsetTracker::new()),
            dead_letter_topic: dead_letter_topic(queue),
        })
    }
}

#[async_trait]
impl MessageSource for KafkaCommandSource {
    async fn receive(&self) -> Result<InboundMessage> {
        let message = self.consumer.recv().await.context("Kafka consumer error")?;

        let id = format!("{}/{}@{}", message.topic(), message.partition(), message.offset());
        let body = message.payload().map(<[u8]>::to_vec).unwrap_or_default();

        self.offsets.track(message.topic(), message.partition(), message.offset())?;

        let delivery = KafkaDelivery {
            consumer: self.consumer.clone(),
            producer: self.producer.clone(),
            offsets: self.offsets.clone(),
            dead_letter_topic: self.dead_letter_topic.clone(),
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: id.clone(),
            body: body.clone(),
        };

        Ok(InboundMessage {
            id,
            body,
            delivery: Box::new(delivery),
        })
    }
}

struct KafkaDelivery {
    consumer: Arc<StreamConsumer>,
    producer: FutureProducer,
    offsets: Arc<OffsetTracker>,
    dead_letter_topic: String,
    topic: String,
    partition: i32,
    offset: i64,
    key: String,
    body: Vec<u8>,
}

impl KafkaDelivery {
    fn settle(&self) -> Result<()> {
        let committed = self.offsets.settle(&self.topic, self.partition, self.offset, |position| {
            let mut positions = TopicPartitionList::new();
            positions.add_partition_offset(&self.topic, self.partition, Offset::Offset(position))?;
            self.consumer
                .commit(&positions, CommitMode::Async)
                .with_context(|| format!("Failed to commit {}/{} at {}", self.topic, self.partition, position))?;
            Ok(())
        })?;

        if let Some(position) = committed {
            tracing::debug!(message_id = %self.key, position, "Committed partition position");
        }
        Ok(())
    }
}

#[async_trait]
impl Delivery for KafkaDelivery {
    async fn complete(&self) -> Result<()> {
        self.settle()
    }

    async fn dead_letter(&self, reason: &str) -> Result<()> {
        let headers = OwnedHeaders::new().insert(Header {
            key: DEAD_LETTER_REASON_HEADER,
            value: Some(reason),
        });

        let record = FutureRecord::to(&self.dead_letter_topic)
            .key(&self.key)
            .payload(&self.body)
            .headers(headers);

        self.producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
            .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;

        tracing::warn!(
            message_id = %self.key,
            topic = %self.dead_letter_topic,
            reason,
            "Published to dead-letter queue"
        );

        self.settle()
    }

    async fn release(&self) -> Result<()> {
        self.settle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_letter_topic_name() {
        assert_eq!(dead_letter_topic("events-received"), "events-received.dlq");
    }
}
