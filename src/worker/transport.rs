use async_trait::async_trait;

// ============================================================================
// Transport Seam
// ============================================================================
//
// The worker only needs three things from a queue: the next message, a way
// to acknowledge it and a way to dead-letter it. Broker specifics stay in
// the implementations (see crate::messaging).
//
// ============================================================================

/// Settlement handle for one received message.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Remove the message from the active queue.
    async fn complete(&self) -> anyhow::Result<()>;

    /// Move the message to the failure queue.
    async fn dead_letter(&self, reason: &str) -> anyhow::Result<()>;

    /// Give up on a message without acknowledging or dead-lettering it.
    /// Transports that track settlement use this to stop waiting on it.
    async fn release(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct InboundMessage {
    pub id: String,
    pub body: Vec<u8>,
    pub delivery: Box<dyn Delivery>,
}

impl std::fmt::Debug for InboundMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundMessage")
            .field("id", &self.id)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for the next message.
    async fn receive(&self) -> anyhow::Result<InboundMessage>;
}
