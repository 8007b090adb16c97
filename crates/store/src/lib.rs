//! Storage layer for the storefront backend.
//!
//! Access to the relational tables goes through an explicit unit of work:
//! one is opened at the start of a workflow method, passed into every
//! repository call, and committed or rolled back exactly once at the end.
//! Two backends implement the same trait: PostgreSQL for deployments and
//! an in-memory store for tests.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{Store, UnitOfWork};
