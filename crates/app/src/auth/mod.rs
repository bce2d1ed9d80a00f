//! Authentication

mod errors;
mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::*;
pub(crate) use repository::SqliteAuthRepository;
pub use service::*;
pub use token::*;
