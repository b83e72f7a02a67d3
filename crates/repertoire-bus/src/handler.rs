//! Message handler abstraction.

use async_trait::async_trait;
use repertoire_core::error::DomainError;

use crate::message::Message;
use crate::topic::Topic;

/// Consumes messages of a single topic.
///
/// Handlers may run concurrently for different messages of the same topic
/// and must be idempotent: returning an error causes redelivery, and every
/// step runs again.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Stable handler name, used for logging and targeted redelivery.
    fn name(&self) -> &'static str;

    /// The topic this handler subscribes to.
    fn topic(&self) -> Topic;

    /// Handles one message.
    ///
    /// # Errors
    ///
    /// Any error is returned to the bus, which redelivers the message.
    async fn handle(&self, message: &Message) -> Result<(), DomainError>;
}
