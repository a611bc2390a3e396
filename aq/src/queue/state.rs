//! Counters and views for the admission queue

use serde::Serialize;

use super::AdmissionQueue;

/// Alternation applies while `elevated / normal >= 1 / ALTERNATION_RATIO_DENOMINATOR`
pub const ALTERNATION_RATIO_DENOMINATOR: usize = 7;

/// Separator between patients in a rendered queue
pub const QUEUE_SEPARATOR: &str = " --> ";

/// Per-class population of the queue at one instant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub elevated: usize,
    pub normal: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.elevated + self.normal
    }

    /// Whether the alternation gate governs the next dequeue
    ///
    /// Compares `elevated / normal` against `1/7` exactly, treating the ratio
    /// as infinite when there are no normal patients.
    pub fn alternation_applies(&self) -> bool {
        self.normal == 0 || self.elevated.saturating_mul(ALTERNATION_RATIO_DENOMINATOR) >= self.normal
    }
}

/// Running totals since the queue was created
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissionStats {
    pub total_admitted: u64,
    pub total_served_elevated: u64,
    pub total_served_normal: u64,
    pub total_updated: u64,
    pub total_empty: u64,
    pub total_no_eligible: u64,
}

impl AdmissionStats {
    pub fn total_served(&self) -> u64 {
        self.total_served_elevated + self.total_served_normal
    }
}

/// Renders the queue head to tail as `[ A (P) ] --> [ B (N) ]`
///
/// An empty queue renders as the empty string.
pub struct QueueView<'a> {
    queue: &'a AdmissionQueue,
}

impl<'a> QueueView<'a> {
    pub fn new(queue: &'a AdmissionQueue) -> Self {
        Self { queue }
    }
}

impl std::fmt::Display for QueueView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, patient) in self.queue.snapshot().enumerate() {
            if i > 0 {
                f.write_str(QUEUE_SEPARATOR)?;
            }
            write!(f, "{}", patient)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriorityClass;

    #[test]
    fn test_alternation_threshold_is_exact() {
        // 1/7 is exactly on the threshold
        assert!(ClassCounts { elevated: 1, normal: 7 }.alternation_applies());
        assert!(!ClassCounts { elevated: 1, normal: 8 }.alternation_applies());
        assert!(!ClassCounts { elevated: 1, normal: 10 }.alternation_applies());
        assert!(ClassCounts { elevated: 2, normal: 14 }.alternation_applies());
        assert!(!ClassCounts { elevated: 2, normal: 15 }.alternation_applies());
        assert!(ClassCounts { elevated: 1, normal: 1 }.alternation_applies());
    }

    #[test]
    fn test_alternation_with_no_normals_is_unbounded() {
        assert!(ClassCounts { elevated: 3, normal: 0 }.alternation_applies());
        assert!(ClassCounts { elevated: 0, normal: 0 }.alternation_applies());
    }

    #[test]
    fn test_no_elevated_never_alternates() {
        assert!(!ClassCounts { elevated: 0, normal: 1 }.alternation_applies());
    }

    #[test]
    fn test_stats_total_served() {
        let stats = AdmissionStats {
            total_served_elevated: 2,
            total_served_normal: 3,
            ..Default::default()
        };
        assert_eq!(stats.total_served(), 5);
    }

    #[test]
    fn test_queue_view_rendering() {
        let mut queue = AdmissionQueue::new();
        assert_eq!(QueueView::new(&queue).to_string(), "");

        queue.enqueue("Ana", 70, PriorityClass::Elevated).unwrap();
        assert_eq!(QueueView::new(&queue).to_string(), "[ Ana (P) ]");

        queue.enqueue("Bruno", 30, PriorityClass::Normal).unwrap();
        assert_eq!(QueueView::new(&queue).to_string(), "[ Ana (P) ] --> [ Bruno (N) ]");
    }
}
