//! `PostgreSQL` implementation of the catalog repositories.

pub mod pg_catalog_repository;
mod rows;
pub mod schema;

pub use pg_catalog_repository::PgCatalogRepository;
