use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::envelope::recv;
use crate::error::PubSubError;
use crate::transport::{Inbound, Provider, Transport};

/// Default number of undrained errors a subscription keeps.
pub const DEFAULT_ERROR_CAPACITY: usize = 64;

/// Opens one transport per subscription.
pub struct Subscriber {
    provider: Arc<dyn Provider>,
    error_capacity: usize,
}

impl Subscriber {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::with_error_capacity(provider, DEFAULT_ERROR_CAPACITY)
    }

    /// Errors beyond `capacity` that nobody drained are dropped.
    pub fn with_error_capacity(provider: Arc<dyn Provider>, capacity: usize) -> Self {
        Self {
            provider,
            error_capacity: capacity.max(1),
        }
    }

    /// Subscribe to `topic`, decoding every envelope as operation `op` and
    /// handing it to `on_message`.
    ///
    /// Suspends once, while the transport subscribes. Afterwards a dedicated
    /// task delivers messages in order. Decode failures (including unknown
    /// methods) and transport errors surface on [`Subscription::next_error`].
    pub async fn subscribe<T, F>(&self, topic: &str, op: &str, on_message: F) -> Result<Subscription, PubSubError>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let transport = self.provider.new_transport();
        let inbound = transport.subscribe(topic).await?;

        let cancel = CancellationToken::new();
        let (err_tx, err_rx) = mpsc::channel(self.error_capacity);
        let task = tokio::spawn(deliver(op.to_string(), inbound, cancel.clone(), err_tx, on_message));
        debug!("subscribed to {} for {}", topic, op);

        Ok(Subscription {
            topic: topic.to_string(),
            transport,
            cancel,
            errors: err_rx,
            task: Some(task),
        })
    }
}

async fn deliver<T, F>(
    op: String,
    mut inbound: Inbound,
    cancel: CancellationToken,
    errors: mpsc::Sender<PubSubError>,
    mut on_message: F,
) where
    T: DeserializeOwned + Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    let mut errors_open = true;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            msg = inbound.messages.recv() => match msg {
                Some(envelope) => match recv::<T>(&op, &envelope) {
                    Ok(req) => on_message(req),
                    Err(e) => {
                        warn!("subscription {}: {}", op, e);
                        report(&op, &errors, e);
                    }
                },
                None => break,
            },
            err = inbound.errors.recv(), if errors_open => match err {
                Some(e) => report(&op, &errors, e),
                None => errors_open = false,
            },
        }
    }
    debug!("subscription {} stopped", op);
}

fn report(op: &str, errors: &mpsc::Sender<PubSubError>, error: PubSubError) {
    match errors.try_send(error) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(e)) => warn!("subscription {}: error queue full, dropping {}", op, e),
    }
}

/// Handle to a live subscription. Dropping it stops delivery.
pub struct Subscription {
    topic: String,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
    errors: mpsc::Receiver<PubSubError>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// False once cancelled or once the delivery task stopped on its own,
    /// for example after the callback panicked.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Next asynchronous failure on this subscription. `None` once the
    /// subscription has stopped and all errors were drained.
    pub async fn next_error(&mut self) -> Option<PubSubError> {
        self.errors.recv().await
    }

    /// Stop delivery and release the transport. No callback runs after this
    /// returns.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        self.transport.close().await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("subscription to {} ended abnormally: {}", self.topic, e);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
        // `unsubscribe` already closed the transport.
        if self.task.is_none() {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let transport = Arc::clone(&self.transport);
                handle.spawn(async move { transport.close().await });
            }
            Err(_) => warn!("subscription to {} dropped outside a runtime, transport left open", self.topic),
        }
    }
}
