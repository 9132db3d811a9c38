//! Runtime side of generated scope code.
//!
//! A publisher frames each request as a call with an increasing sequence
//! number and flushes it to a topic. A subscriber owns one transport per
//! subscription; a dedicated task drains a bounded, in-order channel and
//! invokes the callback until the subscription's cancellation token fires.

pub mod envelope;
pub mod error;
pub mod memory;
pub mod publisher;
pub mod subscriber;
pub mod transport;

pub use envelope::{recv, Envelope, MessageKind};
pub use error::PubSubError;
pub use memory::MemoryBroker;
pub use publisher::Publisher;
pub use subscriber::{Subscriber, Subscription};
pub use transport::{Inbound, Provider, Transport};

/// Topic of one operation: `<prefix><Scope><delimiter><op>`, where `prefix`
/// is the bound scope prefix (already ending in the delimiter, or empty).
pub fn topic(prefix: &str, scope: &str, op: &str, delimiter: &str) -> String {
    let mut chars = scope.chars();
    let scope: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{prefix}{scope}{delimiter}{op}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_format() {
        assert_eq!(topic("user.42.", "events", "Created", "."), "user.42.Events.Created");
        assert_eq!(topic("", "Events", "Created", "."), "Events.Created");
    }
}
