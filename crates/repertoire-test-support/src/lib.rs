//! Shared test fakes for the Repertoire backend.

mod bus;
mod catalog;
mod realtime;
mod search;

pub use bus::{FailingBus, RecordingBus};
pub use catalog::{FailingCatalog, InMemoryCatalog};
pub use realtime::{RecordingBroker, StaticTokenIssuer};
pub use search::{EngineCall, FakeSearchEngine};
