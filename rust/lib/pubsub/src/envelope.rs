use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PubSubError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Call,
    Reply,
    Exception,
    Oneway,
}

/// One framed message: header (name, kind, sequence number) plus the
/// encoded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub name: String,
    pub kind: MessageKind,
    pub seq_id: i32,
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Frame `req` as a call to `name`.
    pub fn call<T: Serialize + ?Sized>(name: &str, seq_id: i32, req: &T) -> Result<Self, PubSubError> {
        let payload = serde_json::to_vec(req).map_err(|e| PubSubError::Encode(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            kind: MessageKind::Call,
            seq_id,
            payload,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PubSubError> {
        serde_json::from_slice(&self.payload).map_err(|e| PubSubError::Decode(e.to_string()))
    }
}

/// Read one envelope for operation `op`.
///
/// A mismatched name fails with [`PubSubError::UnknownMethod`] before the
/// payload is looked at.
pub fn recv<T: DeserializeOwned>(op: &str, envelope: &Envelope) -> Result<T, PubSubError> {
    if envelope.name != op {
        return Err(PubSubError::UnknownMethod {
            expected: op.to_string(),
            received: envelope.name.clone(),
        });
    }
    envelope.decode()
}
