//! Automatic service loop
//!
//! Dequeues one patient per interval from a shared queue until stopped.

mod config;
mod runner;

pub use config::ServiceConfig;
pub use runner::{AutoService, ServiceEvent, ServiceSummary};
