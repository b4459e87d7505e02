//! PXL Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic of the PXL exchange-rate and tier
//! pricing service. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod currency;
pub mod errors;
pub mod payments;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
