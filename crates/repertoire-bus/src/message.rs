//! Bus message envelope.

use repertoire_core::error::DomainError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::topic::Topic;

/// A serialized domain event in transit.
///
/// Ownership passes to the bus on publish; handlers only ever see a shared
/// reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Unique message identifier, stable across redeliveries.
    pub id: Uuid,
    /// Topic the message was published under.
    pub topic: Topic,
    /// JSON-encoded payload.
    pub payload: Vec<u8>,
}

impl Message {
    /// Serializes `payload` into a new message.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if the payload cannot be encoded.
    pub fn encode<T: Serialize + ?Sized>(topic: Topic, payload: &T) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::now_v7(),
            topic,
            payload: serde_json::to_vec(payload)?,
        })
    }

    /// Deserializes the payload.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_slice(&self.payload).map_err(|e| {
            DomainError::Serialization(format!("{} payload: {e}", self.topic))
        })
    }
}
