//! Write-coalescing pipeline.
//!
//! Request handlers never write to storage themselves. They enqueue
//! [`Intent`]s, and a single worker owning a dedicated connection applies
//! everything queued since the first intent of a quiet period in one
//! `BEGIN IMMEDIATE` transaction.

mod config;
mod errors;
mod flush;
mod intent;
mod observer;
mod worker;

pub use config::*;
pub use errors::*;
pub use intent::*;
pub use observer::*;
pub use worker::*;
