//! Repertoire Core: shared domain model and collaborator abstractions.
//!
//! This crate defines the catalog entities (artists, albums, songs), the
//! error taxonomy every pipeline stage reports through, and the traits for
//! collaborators that live outside the search-sync pipeline. It contains no
//! infrastructure code.

pub mod clock;
pub mod error;
pub mod model;
pub mod repository;
pub mod storage;
