//! Domain types for admitq
//!
//! Patients and the priority classes they are admitted under.

mod patient;
mod priority;

pub use patient::{Patient, UpdatePatient};
pub use priority::PriorityClass;
