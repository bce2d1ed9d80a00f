//! Pass Record Handlers

pub(crate) mod publish;
pub(crate) mod query;
