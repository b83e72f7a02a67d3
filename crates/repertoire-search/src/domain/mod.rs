//! Search domain types.

pub mod commands;
pub mod documents;
pub mod filter;
