//! SQLite storage for the PXL pricing service.
//!
//! This crate is the only place where Diesel dependencies exist. It provides
//! connection pooling, embedded migrations, a single-writer actor, a keyed
//! JSON document store and the currency repository built on it.

pub mod currency;
pub mod db;
pub mod documents;
pub mod errors;
pub mod schema;

pub use currency::CurrencyRepository;
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use documents::{DocumentRepository, StoredDocument};
pub use errors::{IntoCore, StorageError};

// Re-export from pxl-core for convenience
pub use pxl_core::errors::{DatabaseError, Error, Result};
