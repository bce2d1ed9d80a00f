//! Users

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::UsersServiceError;
pub(crate) use repository::SqliteUsersRepository;
pub use service::*;
