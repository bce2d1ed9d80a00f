//! Domain Concerns

pub mod passes;
pub mod usage;
pub mod users;
