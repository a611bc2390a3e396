//! Admission queue
//!
//! A doubly linked patient sequence with priority insertion and a
//! starvation-bounded dequeue policy.

mod core;
mod error;
mod list;
mod state;

pub use core::{AdmissionQueue, SharedQueue};
pub use error::QueueError;
pub use list::Snapshot;
pub use state::{ALTERNATION_RATIO_DENOMINATOR, AdmissionStats, ClassCounts, QUEUE_SEPARATOR, QueueView};
