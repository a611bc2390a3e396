//! admitq - patient admission queue
//!
//! A single ordered queue of patients in two service classes. Elevated
//! patients are admitted ahead of every normal patient; service alternates
//! between the classes while elevated patients are at least one seventh of
//! the normal ones, and otherwise prefers elevated patients.
//!
//! # Modules
//!
//! - [`domain`] - Patient records and priority classes
//! - [`queue`] - The admission queue, its errors and views
//! - [`service`] - Interval-driven automatic service
//! - [`repl`] - Interactive session and script runner
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod queue;
pub mod repl;
pub mod service;

// Re-export commonly used types
pub use config::Config;
pub use domain::{Patient, PriorityClass, UpdatePatient};
pub use queue::{AdmissionQueue, QueueError, SharedQueue, Snapshot};
pub use service::{AutoService, ServiceConfig};
