//! Transport abstraction.

use async_trait::async_trait;
use repertoire_core::error::DomainError;

use crate::message::Message;

/// Hands messages to a transport queue.
///
/// Implementations must not buffer or retry: a failure is reported to the
/// caller unchanged so it can surface through the handler that published.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Enqueues `message` on `queue`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the transport rejects the
    /// message.
    async fn send(&self, queue: &str, message: Message) -> Result<(), DomainError>;
}
