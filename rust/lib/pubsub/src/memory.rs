//! In-process broker. Every transport handed out shares one topic table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::PubSubError;
use crate::transport::{Inbound, Provider, Transport};

/// Default per-subscription channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

struct Registration {
    transport_id: u64,
    messages: mpsc::Sender<Envelope>,
    errors: mpsc::Sender<PubSubError>,
}

#[derive(Default)]
struct Topics {
    by_name: Mutex<HashMap<String, Vec<Registration>>>,
    next_id: AtomicU64,
}

/// In-memory [`Provider`].
#[derive(Clone)]
pub struct MemoryBroker {
    topics: Arc<Topics>,
    capacity: usize,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Bounded channels of `capacity` envelopes per subscription.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Topics::default()),
            capacity: capacity.max(1),
        }
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.topics.by_name.lock().unwrap();
        topics.get(topic).map(Vec::len).unwrap_or(0)
    }

    /// Deliver a transport-level error to every subscription on `topic`.
    pub async fn fail(&self, topic: &str, error: PubSubError) {
        let senders: Vec<_> = {
            let topics = self.topics.by_name.lock().unwrap();
            topics
                .get(topic)
                .map(|regs| regs.iter().map(|r| r.errors.clone()).collect())
                .unwrap_or_default()
        };
        for tx in senders {
            let _ = tx.send(error.clone()).await;
        }
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for MemoryBroker {
    fn new_transport(&self) -> Arc<dyn Transport> {
        let id = self.topics.next_id.fetch_add(1, Ordering::Relaxed);
        Arc::new(MemoryTransport {
            id,
            topics: Arc::clone(&self.topics),
            capacity: self.capacity,
            topic: Mutex::new(None),
            buffer: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }
}

struct MemoryTransport {
    id: u64,
    topics: Arc<Topics>,
    capacity: usize,
    topic: Mutex<Option<String>>,
    buffer: Mutex<Vec<Envelope>>,
    closed: AtomicBool,
}

#[async_trait]
impl Transport for MemoryTransport {
    fn prepare_publish(&self, topic: &str) {
        *self.topic.lock().unwrap() = Some(topic.to_string());
    }

    fn write(&self, envelope: Envelope) -> Result<(), PubSubError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PubSubError::Closed);
        }
        self.buffer.lock().unwrap().push(envelope);
        Ok(())
    }

    async fn flush(&self) -> Result<(), PubSubError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PubSubError::Closed);
        }
        let topic = self
            .topic
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PubSubError::Transport("flush without a prepared topic".to_string()))?;
        let pending = std::mem::take(&mut *self.buffer.lock().unwrap());

        // Snapshot the senders so no lock is held across an await.
        let senders: Vec<_> = {
            let topics = self.topics.by_name.lock().unwrap();
            topics
                .get(&topic)
                .map(|regs| regs.iter().map(|r| r.messages.clone()).collect())
                .unwrap_or_default()
        };
        debug!("flush {} messages to {} subscribers on {}", pending.len(), senders.len(), topic);

        for envelope in pending {
            for tx in &senders {
                // A closed receiver means the subscription went away.
                let _ = tx.send(envelope.clone()).await;
            }
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Inbound, PubSubError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PubSubError::Closed);
        }
        let (msg_tx, msg_rx) = mpsc::channel(self.capacity);
        let (err_tx, err_rx) = mpsc::channel(self.capacity);
        self.topics
            .by_name
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push(Registration {
                transport_id: self.id,
                messages: msg_tx,
                errors: err_tx,
            });
        debug!("transport {} subscribed to {}", self.id, topic);
        Ok(Inbound {
            messages: msg_rx,
            errors: err_rx,
        })
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut topics = self.topics.by_name.lock().unwrap();
        for regs in topics.values_mut() {
            regs.retain(|r| r.transport_id != self.id);
        }
        topics.retain(|_, regs| !regs.is_empty());
        debug!("transport {} closed", self.id);
    }
}
