//! Test buses: mock `MessageBus` implementations for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use repertoire_bus::{Message, MessageBus, Publisher, Topic, TopicRegistry};
use repertoire_core::error::DomainError;
use serde::de::DeserializeOwned;

/// A bus that records every message sent, in order, and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingBus {
    sent: Mutex<Vec<(String, Message)>>,
}

impl RecordingBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher over a fresh recording bus with the default topic table.
    #[must_use]
    pub fn publisher() -> (Publisher, Arc<Self>) {
        let bus = Arc::new(Self::new());
        let publisher = Publisher::new(bus.clone(), Arc::new(TopicRegistry::default()));
        (publisher, bus)
    }

    /// Returns a snapshot of all `(queue, message)` pairs sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<(String, Message)> {
        self.sent.lock().unwrap().clone()
    }

    /// Topics of all messages sent, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn topics(&self) -> Vec<Topic> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.topic)
            .collect()
    }

    /// Decodes every payload sent on `topic`.
    ///
    /// # Panics
    ///
    /// Panics if a payload does not decode as `T`.
    pub fn payloads<T: DeserializeOwned>(&self, topic: Topic) -> Vec<T> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, message)| message.topic == topic)
            .map(|(_, message)| {
                message
                    .decode()
                    .unwrap_or_else(|e| panic!("payload on {topic} did not decode: {e}"))
            })
            .collect()
    }

    /// Forgets everything sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessageBus for RecordingBus {
    async fn send(&self, queue: &str, message: Message) -> Result<(), DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((queue.to_owned(), message));
        Ok(())
    }
}

/// A bus that rejects every message with an infrastructure error.
#[derive(Debug)]
pub struct FailingBus;

#[async_trait]
impl MessageBus for FailingBus {
    async fn send(&self, queue: &str, _message: Message) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure(format!("queue {queue} unavailable")))
    }
}
