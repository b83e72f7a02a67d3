//! Repertoire: search index and storage synchronization.
//!
//! Lifecycle handlers subscribe to the Artist, Album, Song and User topics,
//! rebuild the affected search documents from authoritative state, and
//! publish search commands and storage cleanup commands in response. They
//! never mutate the index themselves.

pub mod application;
pub mod domain;
