//! Bus handlers that execute search commands against the engine.

pub mod dispatch_handlers;
