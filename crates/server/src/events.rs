// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live callback feed: broadcast hub with a bounded backfill buffer.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

/// How many recent callbacks a newly connected client receives as backfill.
const BACKFILL_CAPACITY: usize = 100;

/// One received webhook callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEvent {
    pub id: String,
    pub received_at_ms: u64,
    pub signature_valid: bool,
    pub body: serde_json::Value,
}

/// Fans received callbacks out to connected dashboard clients.
pub struct CallbackHub {
    event_tx: broadcast::Sender<CallbackEvent>,
    recent: RwLock<VecDeque<CallbackEvent>>,
}

impl CallbackHub {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { event_tx, recent: RwLock::new(VecDeque::new()) }
    }

    /// Subscribe to future callbacks.
    pub fn subscribe(&self) -> broadcast::Receiver<CallbackEvent> {
        self.event_tx.subscribe()
    }

    /// Record a callback and fan it out.
    pub async fn publish(&self, event: CallbackEvent) {
        {
            let mut recent = self.recent.write().await;
            if recent.len() == BACKFILL_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(event.clone());
        }
        let _ = self.event_tx.send(event);
    }

    /// Recent callbacks, oldest first.
    pub async fn backfill(&self) -> Vec<CallbackEvent> {
        self.recent.read().await.iter().cloned().collect()
    }

    /// Total callbacks currently buffered.
    pub async fn count(&self) -> usize {
        self.recent.read().await.len()
    }
}

impl Default for CallbackHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> CallbackEvent {
        CallbackEvent {
            id: id.to_owned(),
            received_at_ms: 0,
            signature_valid: true,
            body: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscribers_and_backfill() -> anyhow::Result<()> {
        let hub = CallbackHub::new();
        let mut rx = hub.subscribe();

        hub.publish(event("e1")).await;
        assert_eq!(rx.recv().await?.id, "e1");

        let backfill = hub.backfill().await;
        assert_eq!(backfill.len(), 1);
        assert_eq!(backfill[0].id, "e1");
        Ok(())
    }

    #[tokio::test]
    async fn backfill_is_bounded_and_ordered() {
        let hub = CallbackHub::new();
        for i in 0..(BACKFILL_CAPACITY + 5) {
            hub.publish(event(&format!("e{i}"))).await;
        }
        let backfill = hub.backfill().await;
        assert_eq!(backfill.len(), BACKFILL_CAPACITY);
        // Oldest entries were evicted first.
        assert_eq!(backfill[0].id, "e5");
        assert_eq!(backfill[BACKFILL_CAPACITY - 1].id, format!("e{}", BACKFILL_CAPACITY + 4));
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_fail() {
        let hub = CallbackHub::new();
        hub.publish(event("lonely")).await;
        assert_eq!(hub.count().await, 1);
    }
}
