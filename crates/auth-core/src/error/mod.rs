//! Error types for the domain layer and its ports

mod collaborator;
mod domain_error;

pub use collaborator::{BusError, DirectoryError};
pub use domain_error::DomainError;
