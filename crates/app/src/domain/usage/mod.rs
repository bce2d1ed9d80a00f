//! Usage ledger

pub mod records;
mod repository;

pub(crate) use repository::SqliteUsageRepository;
