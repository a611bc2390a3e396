//! Queue error types

use thiserror::Error;

use crate::domain::PriorityClass;

/// Errors reported by admission queue operations
///
/// No variant is returned after the patient sequence has been changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Queue is empty")]
    EmptyQueue,

    #[error("No {class} patient available to serve")]
    NoEligiblePatient { class: PriorityClass },

    #[error("Patient not found: {name}")]
    NotFound { name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl QueueError {
    /// True when a dequeue found nothing at all to serve
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, QueueError::EmptyQueue)
    }
}
