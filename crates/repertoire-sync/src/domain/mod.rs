//! Sync domain types.

pub mod commands;
pub mod events;
