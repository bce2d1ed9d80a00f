//! Pass records

pub mod codec;
pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;
pub mod store;

pub use errors::{PassesError, PassesServiceError, UnauthorizedReason};
pub(crate) use repository::SqlitePassesRepository;
pub use service::*;
pub use store::*;
