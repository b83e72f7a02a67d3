//! Event publisher.

use std::sync::Arc;

use repertoire_core::error::DomainError;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::bus::MessageBus;
use crate::message::Message;
use crate::topic::{Topic, TopicRegistry};

/// Serializes payloads, resolves their queue and hands them to the bus.
///
/// No buffering or retry happens here; a handler that publishes propagates
/// the failure and relies on redelivery.
#[derive(Clone)]
pub struct Publisher {
    bus: Arc<dyn MessageBus>,
    registry: Arc<TopicRegistry>,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    /// Creates a publisher over `bus`.
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>, registry: Arc<TopicRegistry>) -> Self {
        Self { bus, registry }
    }

    /// Publishes `payload` under `topic` and returns the message id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if the payload cannot be encoded,
    /// `DomainError::UnknownTopic` if the topic has no queue, or whatever
    /// error the bus reports.
    pub async fn publish<T>(&self, topic: Topic, payload: &T) -> Result<Uuid, DomainError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let message = Message::encode(topic, payload)?;
        let queue = self.registry.queue_for(topic)?;
        let message_id = message.id;

        self.bus.send(queue, message).await?;

        debug!(%topic, %message_id, queue, "published message");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct CapturingBus {
        sent: Mutex<Vec<(String, Message)>>,
    }

    #[async_trait]
    impl MessageBus for CapturingBus {
        async fn send(&self, queue: &str, message: Message) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push((queue.to_owned(), message));
            Ok(())
        }
    }

    struct DownBus;

    #[async_trait]
    impl MessageBus for DownBus {
        async fn send(&self, _queue: &str, _message: Message) -> Result<(), DomainError> {
            Err(DomainError::Infrastructure("broker unreachable".into()))
        }
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not encodable"))
        }
    }

    #[tokio::test]
    async fn test_publish_routes_to_topic_queue() {
        // Arrange
        let bus = Arc::new(CapturingBus::default());
        let publisher = Publisher::new(bus.clone(), Arc::new(TopicRegistry::default()));
        let payload = serde_json::json!({ "id": Uuid::new_v4() });

        // Act
        let message_id = publisher
            .publish(Topic::ArtistUpdated, &payload)
            .await
            .unwrap();

        // Assert
        let sent = bus.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (queue, message) = &sent[0];
        assert_eq!(queue, "artist-updated-queue");
        assert_eq!(message.id, message_id);
        assert_eq!(message.topic, Topic::ArtistUpdated);
        assert_eq!(
            message.decode::<serde_json::Value>().unwrap(),
            payload
        );
    }

    #[tokio::test]
    async fn test_publish_fails_for_unencodable_payload() {
        let bus = Arc::new(CapturingBus::default());
        let publisher = Publisher::new(bus.clone(), Arc::new(TopicRegistry::default()));

        let result = publisher.publish(Topic::SongCreated, &Unencodable).await;

        assert!(matches!(result, Err(DomainError::Serialization(_))));
        assert!(bus.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_fails_for_unregistered_topic() {
        let bus = Arc::new(CapturingBus::default());
        let registry = TopicRegistry::with_queues([(Topic::SongCreated, "songs")]);
        let publisher = Publisher::new(bus.clone(), Arc::new(registry));

        let result = publisher.publish(Topic::AlbumCreated, &()).await;

        assert!(matches!(result, Err(DomainError::UnknownTopic(_))));
        assert!(bus.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_propagates_bus_failure_unchanged() {
        let publisher = Publisher::new(Arc::new(DownBus), Arc::new(TopicRegistry::default()));

        let result = publisher.publish(Topic::SongCreated, &()).await;

        match result {
            Err(DomainError::Infrastructure(msg)) => assert_eq!(msg, "broker unreachable"),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
