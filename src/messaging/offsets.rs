use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use anyhow::Result;

// ============================================================================
// Offset Tracking
// ============================================================================
//
// Messages from one partition are processed concurrently and settle in any
// order, but a Kafka commit moves the whole partition position. The tracker
// only ever commits the lowest offset that is still unsettled (or one past
// the highest settled offset once nothing is in flight), so a crash can
// never skip a message that was still being processed, and the committed
// position never moves backwards.
//
// ============================================================================

#[derive(Debug)]
struct PartitionState {
    in_flight: BTreeSet<i64>,
    highest_settled: Option<i64>,
    committed: i64,
}

impl PartitionState {
    fn starting_at(offset: i64) -> Self {
        Self {
            in_flight: BTreeSet::new(),
            highest_settled: None,
            committed: offset,
        }
    }

    /// Position the consumer may safely resume from.
    fn safe_position(&self) -> Option<i64> {
        match self.in_flight.first() {
            Some(&lowest) => Some(lowest),
            None => self.highest_settled.map(|offset| offset + 1),
        }
    }
}

#[derive(Debug, Default)]
pub struct OffsetTracker {
    partitions: Mutex<HashMap<(String, i32), PartitionState>>,
}

impl OffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received offset as in flight.
    pub fn track(&self, topic: &str, partition: i32, offset: i64) -> Result<()> {
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| anyhow::anyhow!("offset tracker lock poisoned"))?;

        partitions
            .entry((topic.to_string(), partition))
            .or_insert_with(|| PartitionState::starting_at(offset))
            .in_flight
            .insert(offset);
        Ok(())
    }

    /// Mark `offset` settled and, when the safe position advanced, hand it to
    /// `commit` while still holding the lock so commits are issued in order.
    ///
    /// Returns the committed position, if any.
    pub fn settle<F>(&self, topic: &str, partition: i32, offset: i64, commit: F) -> Result<Option<i64>>
    where
        F: FnOnce(i64) -> Result<()>,
    {
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| anyhow::anyhow!("offset tracker lock poisoned"))?;

        let state = partitions
            .entry((topic.to_string(), partition))
            .or_insert_with(|| PartitionState::starting_at(offset));

        state.in_flight.remove(&offset);
        state.highest_settled = Some(state.highest_settled.map_or(offset, |high| high.max(offset)));

        match state.safe_position() {
            Some(position) if position > state.committed => {
                commit(position)?;
                state.committed = position;
                Ok(Some(position))
            }
            _ => Ok(None),
        }
    }
}
