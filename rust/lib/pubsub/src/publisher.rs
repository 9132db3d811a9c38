use std::sync::Arc;

use serde::Serialize;

use crate::envelope::Envelope;
use crate::error::PubSubError;
use crate::transport::{Provider, Transport};

/// Publishes framed calls on one transport.
///
/// The sequence counter belongs to the instance; `publish` takes `&mut self`
/// so concurrent increments need external synchronization by construction.
pub struct Publisher {
    transport: Arc<dyn Transport>,
    seq_id: i32,
}

impl Publisher {
    pub fn new(provider: &dyn Provider) -> Self {
        Self {
            transport: provider.new_transport(),
            seq_id: 0,
        }
    }

    /// Sequence number of the last published message.
    pub fn seq_id(&self) -> i32 {
        self.seq_id
    }

    /// Publish `req` as operation `op` on `topic`. Only the final flush
    /// suspends; its failure is returned as-is.
    pub async fn publish<T: Serialize + ?Sized>(&mut self, topic: &str, op: &str, req: &T) -> Result<(), PubSubError> {
        self.transport.prepare_publish(topic);
        self.seq_id = self.seq_id.wrapping_add(1);
        let envelope = Envelope::call(op, self.seq_id, req)?;
        self.transport.write(envelope)?;
        self.transport.flush().await
    }

    pub async fn close(&self) {
        self.transport.close().await;
    }
}
