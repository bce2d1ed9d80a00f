//! Storage, identity and write pipeline for the DryCI pass cache.

pub mod auth;
pub mod bootstrap;
pub mod context;
pub mod database;
pub mod domain;
pub mod ids;
pub mod pipeline;

#[cfg(test)]
mod test;

mod timestamps;
