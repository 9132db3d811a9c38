use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PubSubError {
    /// An envelope arrived for a different operation than the one
    /// subscribed to. The payload is skipped, never decoded.
    #[error("unknown method {received:?} (expected {expected:?})")]
    UnknownMethod { expected: String, received: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("transport closed")]
    Closed,
}
