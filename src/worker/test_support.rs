use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::transport::{Delivery, InboundMessage, MessageSource};
use crate::messaging::OffsetTracker;

const TOPIC: &str = "events-received";

enum Entry {
    Message { id: String, body: Vec<u8>, offset: i64 },
    Fault(String),
}

#[derive(Default)]
struct Settlements {
    acked: Vec<String>,
    dead_lettered: Vec<(String, String)>,
    released: Vec<String>,
    commits: Vec<i64>,
}

#[derive(Default)]
struct Inner {
    pending: Mutex<VecDeque<Entry>>,
    settlements: Mutex<Settlements>,
    notify: Notify,
    refuse_dead_letters: bool,
    next_offset: AtomicI64,
    offsets: OffsetTracker,
}

impl Inner {
    fn assign_offset(&self) -> i64 {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        self.offsets.track(TOPIC, 0, offset).unwrap();
        offset
    }

    fn settle(&self, offset: i64) {
        self.offsets
            .settle(TOPIC, 0, offset, |position| {
                self.settlements.lock().unwrap().commits.push(position);
                Ok(())
            })
            .unwrap();
    }
}

/// Queue double that records every ack and dead-letter. Messages get
/// consecutive offsets on a single partition, and settlements go through an
/// `OffsetTracker` so committed positions can be observed.
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    inner: Arc<Inner>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_dead_letters(self) -> Self {
        Self {
            inner: Arc::new(Inner {
                refuse_dead_letters: true,
                ..Default::default()
            }),
        }
    }

    /// Build a message bound to this queue without enqueuing it.
    pub fn message(&self, id: &str, body: &str) -> InboundMessage {
        InboundMessage {
            id: id.to_string(),
            body: body.as_bytes().to_vec(),
            delivery: Box::new(MemoryDelivery {
                id: id.to_string(),
                offset: self.inner.assign_offset(),
                inner: self.inner.clone(),
            }),
        }
    }

    pub fn push(&self, id: &str, body: &str) {
        self.enqueue(Entry::Message {
            id: id.to_string(),
            body: body.as_bytes().to_vec(),
            offset: self.inner.next_offset.fetch_add(1, Ordering::SeqCst),
        });
    }

    /// Make the next receive fail as a broker error would.
    pub fn push_transport_fault(&self, reason: &str) {
        self.enqueue(Entry::Fault(reason.to_string()));
    }

    pub fn acked(&self) -> Vec<String> {
        self.inner.settlements.lock().unwrap().acked.clone()
    }

    pub fn dead_lettered(&self) -> Vec<(String, String)> {
        self.inner.settlements.lock().unwrap().dead_lettered.clone()
    }

    pub fn released(&self) -> Vec<String> {
        self.inner.settlements.lock().unwrap().released.clone()
    }

    /// Partition positions committed so far, in order.
    pub fn commits(&self) -> Vec<i64> {
        self.inner.settlements.lock().unwrap().commits.clone()
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }

    fn enqueue(&self, entry: Entry) {
        self.inner.pending.lock().unwrap().push_back(entry);
        self.inner.notify.notify_one();
    }
}

#[async_trait]
impl MessageSource for InMemoryQueue {
    async fn receive(&self) -> anyhow::Result<InboundMessage> {
        loop {
            let notified = self.inner.notify.notified();
            let next = self.inner.pending.lock().unwrap().pop_front();
            match next {
                Some(Entry::Message { id, body, offset }) => {
                    self.inner.offsets.track(TOPIC, 0, offset)?;
                    return Ok(InboundMessage {
                        delivery: Box::new(MemoryDelivery {
                            id: id.clone(),
                            offset,
                            inner: self.inner.clone(),
                        }),
                        id,
                        body,
                    });
                }
                Some(Entry::Fault(reason)) => anyhow::bail!("transport fault: {reason}"),
                None => notified.await,
            }
        }
    }
}

struct MemoryDelivery {
    id: String,
    offset: i64,
    inner: Arc<Inner>,
}

#[async_trait]
impl Delivery for MemoryDelivery {
    async fn complete(&self) -> anyhow::Result<()> {
        self.inner.settlements.lock().unwrap().acked.push(self.id.clone());
        self.inner.settle(self.offset);
        Ok(())
    }

    async fn dead_letter(&self, reason: &str) -> anyhow::Result<()> {
        if self.inner.refuse_dead_letters {
            anyhow::bail!("dead-letter queue unavailable");
        }
        self.inner
            .settlements
            .lock()
            .unwrap()
            .dead_lettered
            .push((self.id.clone(), reason.to_string()));
        self.inner.settle(self.offset);
        Ok(())
    }

    async fn release(&self) -> anyhow::Result<()> {
        self.inner.settlements.lock().unwrap().released.push(self.id.clone());
        self.inner.settle(self.offset);
        Ok(())
    }
}
