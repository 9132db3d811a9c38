use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::envelope::Envelope;
use crate::error::PubSubError;

/// Receiving side of a topic subscription. Envelopes arrive in publish
/// order; transport failures arrive on `errors`.
pub struct Inbound {
    pub messages: mpsc::Receiver<Envelope>,
    pub errors: mpsc::Receiver<PubSubError>,
}

/// Pub/sub transport plus its protocol.
///
/// Publishing is `prepare_publish` then `write` (both immediate) then
/// `flush`, the only suspension point.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Set the topic the next flush publishes to.
    fn prepare_publish(&self, topic: &str);

    /// Buffer one framed message.
    fn write(&self, envelope: Envelope) -> Result<(), PubSubError>;

    /// Publish buffered messages.
    async fn flush(&self) -> Result<(), PubSubError>;

    async fn subscribe(&self, topic: &str) -> Result<Inbound, PubSubError>;

    /// Release the transport. Subscriptions made through it stop receiving.
    async fn close(&self);
}

/// Hands out fresh transports.
pub trait Provider: Send + Sync + 'static {
    fn new_transport(&self) -> Arc<dyn Transport>;
}
