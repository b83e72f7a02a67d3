//! Repertoire Bus: event transport for the search-sync pipeline.
//!
//! Every domain event travels as a [`Message`] tagged with a [`Topic`].
//! The [`TopicRegistry`] maps each topic to exactly one transport queue,
//! the [`Publisher`] serializes payloads and hands them to a
//! [`MessageBus`], and [`MessageHandler`]s consume them. Delivery is
//! at-least-once: a handler that returns an error sees the message again.

pub mod bus;
pub mod handler;
pub mod in_memory;
pub mod message;
pub mod publisher;
pub mod topic;

pub use bus::MessageBus;
pub use handler::MessageHandler;
pub use in_memory::{BusConfig, BusHandle, InMemoryBus};
pub use message::Message;
pub use publisher::Publisher;
pub use topic::{Topic, TopicRegistry};
