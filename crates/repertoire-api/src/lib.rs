//! Repertoire API: HTTP surface and runtime wiring for the search sync
//! pipeline.

pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod telemetry;
