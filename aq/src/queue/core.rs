//! Admission queue implementation

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Patient, PriorityClass, UpdatePatient};

use super::error::QueueError;
use super::list::{PatientList, Snapshot};
use super::state::{AdmissionStats, ClassCounts, QueueView};

/// Queue handle shared between the interactive session and the auto service
///
/// Hold the guard for one operation at a time.
pub type SharedQueue = Arc<Mutex<AdmissionQueue>>;

/// Which rule picked the class for a dequeue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServeRule {
    /// Population is balanced enough to take turns
    Alternation,
    /// Elevated patients are rare, serve them first
    Preference,
}

/// Patient queue with priority insertion and starvation-bounded service
///
/// Elevated patients are admitted behind the leading run of elevated patients
/// and ahead of the first normal one; normal patients join at the tail. Service
/// alternates between classes while elevated patients make up at least one in
/// seven of the normal population, and otherwise serves elevated patients first.
#[derive(Debug)]
pub struct AdmissionQueue {
    list: PatientList,
    next_to_serve: PriorityClass,
    stats: AdmissionStats,
}

impl Default for AdmissionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionQueue {
    /// Create an empty queue; the first alternating dequeue serves elevated
    pub fn new() -> Self {
        debug!("AdmissionQueue::new: called");
        Self {
            list: PatientList::new(),
            next_to_serve: PriorityClass::Elevated,
            stats: AdmissionStats::default(),
        }
    }

    /// Wrap the queue for shared, serialized access
    pub fn into_shared(self) -> SharedQueue {
        Arc::new(Mutex::new(self))
    }

    /// Admit a patient
    ///
    /// The name is trimmed and must not be empty.
    pub fn enqueue(&mut self, name: impl Into<String>, age: u32, priority_class: PriorityClass) -> Result<(), QueueError> {
        let name = validate_name(name.into())?;
        debug!(%name, age, ?priority_class, "AdmissionQueue::enqueue: called");
        let patient = Patient::new(name, age, priority_class);

        let boundary = match priority_class {
            PriorityClass::Elevated => self.list.position(|p| !p.is_elevated()),
            PriorityClass::Normal => None,
        };

        match boundary {
            Some(at) => {
                debug!(at, head = ?self.list.head(), "AdmissionQueue::enqueue: inserting before first normal");
                self.list.insert_before(at, patient);
            }
            None => {
                debug!("AdmissionQueue::enqueue: appending at tail");
                self.list.push_back(patient);
            }
        }

        self.stats.total_admitted += 1;
        debug_assert!(self.list.links_consistent());
        Ok(())
    }

    /// Serve one patient
    ///
    /// Counts both classes, picks a class through the alternation gate or the
    /// elevated preference, then removes the first patient of that class.
    pub fn dequeue(&mut self) -> Result<Patient, QueueError> {
        debug!(next_to_serve = ?self.next_to_serve, "AdmissionQueue::dequeue: called");
        if self.list.is_empty() {
            debug!("AdmissionQueue::dequeue: queue empty");
            self.stats.total_empty += 1;
            return Err(QueueError::EmptyQueue);
        }

        let counts = self.counts();
        let (class, rule) = self.select_class(counts);
        debug!(?counts, ?class, ?rule, next_to_serve = ?self.next_to_serve, "AdmissionQueue::dequeue: class selected");

        let Some(idx) = self.list.position(|p| p.priority_class == class) else {
            debug!(?class, "AdmissionQueue::dequeue: no patient of selected class");
            self.stats.total_no_eligible += 1;
            return Err(QueueError::NoEligiblePatient { class });
        };

        let patient = self.list.unlink(idx);
        match class {
            PriorityClass::Elevated => self.stats.total_served_elevated += 1,
            PriorityClass::Normal => self.stats.total_served_normal += 1,
        }
        debug_assert!(self.list.links_consistent());
        debug!(name = %patient.name, ?class, "AdmissionQueue::dequeue: served");
        Ok(patient)
    }

    /// Pick the class to serve; flips `next_to_serve` only under alternation
    fn select_class(&mut self, counts: ClassCounts) -> (PriorityClass, ServeRule) {
        if counts.alternation_applies() {
            let class = self.next_to_serve;
            self.next_to_serve = class.other();
            (class, ServeRule::Alternation)
        } else if counts.elevated > 0 {
            (PriorityClass::Elevated, ServeRule::Preference)
        } else {
            (PriorityClass::Normal, ServeRule::Preference)
        }
    }

    /// Edit the first patient named `name` in place
    ///
    /// The patient keeps its position even when its class changes.
    pub fn update(&mut self, name: &str, changes: UpdatePatient) -> Result<(), QueueError> {
        debug!(%name, ?changes, "AdmissionQueue::update: called");
        if changes.is_empty() {
            debug!(%name, "AdmissionQueue::update: no fields to change");
        }
        let changes = UpdatePatient {
            name: changes.name.map(validate_name).transpose()?,
            ..changes
        };

        let Some(patient) = self
            .list
            .position(|p| p.name == name)
            .and_then(|idx| self.list.get_mut(idx))
        else {
            debug!(%name, "AdmissionQueue::update: not found");
            return Err(QueueError::NotFound { name: name.to_string() });
        };

        changes.apply_to(patient);
        self.stats.total_updated += 1;
        debug!(%name, "AdmissionQueue::update: updated");
        Ok(())
    }

    /// Head-to-tail view of the queued patients
    pub fn snapshot(&self) -> Snapshot<'_> {
        self.list.iter()
    }

    /// Displayable rendering of the current queue
    pub fn view(&self) -> QueueView<'_> {
        QueueView::new(self)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Count patients per class with a full scan
    pub fn counts(&self) -> ClassCounts {
        self.snapshot().fold(ClassCounts::default(), |mut counts, patient| {
            match patient.priority_class {
                PriorityClass::Elevated => counts.elevated += 1,
                PriorityClass::Normal => counts.normal += 1,
            }
            counts
        })
    }

    /// Class the alternation gate will serve next
    pub fn next_to_serve(&self) -> PriorityClass {
        self.next_to_serve
    }

    pub fn stats(&self) -> AdmissionStats {
        self.stats
    }

    /// Check that head, tail and every prev/next pair agree
    pub fn links_consistent(&self) -> bool {
        self.list.links_consistent()
    }
}

fn validate_name(name: String) -> Result<String, QueueError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(QueueError::InvalidArgument("patient name must not be empty".to_string()));
    }
    if trimmed.len() == name.len() {
        Ok(name)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PriorityClass::{Elevated, Normal};

    fn names(queue: &AdmissionQueue) -> Vec<String> {
        queue.snapshot().map(|p| p.name.clone()).collect()
    }

    fn queue_with(entries: &[(&str, PriorityClass)]) -> AdmissionQueue {
        let mut queue = AdmissionQueue::new();
        for (name, class) in entries {
            queue.enqueue(*name, 30, *class).unwrap();
        }
        queue
    }

    #[test]
    fn test_new_queue_starts_with_elevated_turn() {
        let queue = AdmissionQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.next_to_serve(), Elevated);
        assert!(queue.links_consistent());
    }

    #[test]
    fn test_enqueue_into_empty_queue() {
        let queue = queue_with(&[("a", Normal)]);
        assert_eq!(names(&queue), vec!["a"]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_elevated_after_elevated_run() {
        let mut queue = queue_with(&[("e1", Elevated), ("e2", Elevated), ("n", Normal)]);
        assert_eq!(names(&queue), vec!["e1", "e2", "n"]);

        queue.enqueue("e3", 50, Elevated).unwrap();
        assert_eq!(names(&queue), vec!["e1", "e2", "e3", "n"]);
        assert!(queue.links_consistent());
    }

    #[test]
    fn test_enqueue_elevated_at_head_when_no_elevated() {
        let mut queue = queue_with(&[("n1", Normal), ("n2", Normal)]);
        queue.enqueue("e", 50, Elevated).unwrap();
        assert_eq!(names(&queue), vec!["e", "n1", "n2"]);
        assert!(queue.links_consistent());
    }

    #[test]
    fn test_enqueue_elevated_appends_when_all_elevated() {
        let queue = queue_with(&[("e1", Elevated), ("e2", Elevated), ("e3", Elevated)]);
        assert_eq!(names(&queue), vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_enqueue_normal_always_appends() {
        let queue = queue_with(&[("n1", Normal), ("e", Elevated), ("n2", Normal)]);
        assert_eq!(names(&queue), vec!["e", "n1", "n2"]);
    }

    #[test]
    fn test_enqueue_rejects_blank_name() {
        let mut queue = AdmissionQueue::new();
        let err = queue.enqueue("   ", 30, Normal).unwrap_err();
        assert!(matches!(err, QueueError::InvalidArgument(_)));
        assert!(queue.is_empty());
        assert_eq!(queue.stats().total_admitted, 0);
    }

    #[test]
    fn test_enqueue_trims_name() {
        let queue = queue_with(&[("  Ana ", Normal)]);
        assert_eq!(names(&queue), vec!["Ana"]);
    }

    #[test]
    fn test_dequeue_empty_keeps_turn() {
        let mut queue = AdmissionQueue::new();
        assert_eq!(queue.dequeue(), Err(QueueError::EmptyQueue));
        assert_eq!(queue.next_to_serve(), Elevated);
        assert_eq!(queue.stats().total_empty, 1);
    }

    #[test]
    fn test_dequeue_alternates_when_balanced() {
        let mut queue = queue_with(&[("e", Elevated), ("n", Normal)]);

        let first = queue.dequeue().unwrap();
        assert_eq!(first.name, "e");
        assert_eq!(queue.next_to_serve(), Normal);

        // only one normal left, so this call takes the preference branch
        let second = queue.dequeue().unwrap();
        assert_eq!(second.name, "n");
        assert_eq!(queue.next_to_serve(), Normal);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_toggles_twice_while_population_stays_balanced() {
        let mut queue = queue_with(&[("e0", Elevated), ("e1", Elevated), ("n0", Normal), ("n1", Normal)]);

        assert_eq!(queue.dequeue().unwrap().name, "e0");
        assert_eq!(queue.next_to_serve(), Normal);

        // 1 elevated, 2 normal: still at or above 1/7
        assert_eq!(queue.dequeue().unwrap().name, "n0");
        assert_eq!(queue.next_to_serve(), Elevated);
    }

    #[test]
    fn test_dequeue_alternation_follows_current_turn() {
        let mut queue = queue_with(&[("e0", Elevated), ("n0", Normal)]);
        queue.dequeue().unwrap();
        assert_eq!(queue.next_to_serve(), Normal);

        // n0 is still queued; add one elevated so the population is 1:1 again
        queue.enqueue("e1", 30, Elevated).unwrap();
        assert_eq!(queue.dequeue().unwrap().name, "n0");
        assert_eq!(queue.next_to_serve(), Elevated);
    }

    #[test]
    fn test_dequeue_prefers_elevated_when_dominated_by_normals() {
        // a balanced dequeue first moves the turn to Normal so a toggle would show
        let mut queue = queue_with(&[("e0", Elevated), ("n0", Normal)]);
        assert_eq!(queue.dequeue().unwrap().name, "e0");
        assert_eq!(queue.next_to_serve(), Normal);

        for i in 1..10 {
            queue.enqueue(format!("n{i}"), 30, Normal).unwrap();
        }
        queue.enqueue("e1", 80, Elevated).unwrap();
        assert_eq!(queue.counts(), ClassCounts { elevated: 1, normal: 10 });

        let served = queue.dequeue().unwrap();
        assert_eq!(served.name, "e1");
        assert_eq!(queue.next_to_serve(), Normal);
        assert_eq!(queue.dequeue().unwrap().name, "n0");
    }

    #[test]
    fn test_dequeue_serves_normal_when_no_elevated() {
        let mut queue = queue_with(&[("n1", Normal), ("n2", Normal)]);
        assert_eq!(queue.dequeue().unwrap().name, "n1");
        assert_eq!(queue.next_to_serve(), Elevated);
    }

    #[test]
    fn test_dequeue_no_eligible_flips_turn_without_removal() {
        let mut queue = queue_with(&[("e1", Elevated), ("e2", Elevated)]);
        assert_eq!(queue.dequeue().unwrap().name, "e1");
        assert_eq!(queue.next_to_serve(), Normal);

        let err = queue.dequeue().unwrap_err();
        assert_eq!(err, QueueError::NoEligiblePatient { class: Normal });
        assert_eq!(names(&queue), vec!["e2"]);
        assert_eq!(queue.next_to_serve(), Elevated);
        assert_eq!(queue.stats().total_no_eligible, 1);

        assert_eq!(queue.dequeue().unwrap().name, "e2");
    }

    #[test]
    fn test_single_element_queue() {
        let mut queue = queue_with(&[("only", Normal)]);
        // one normal, zero elevated: preference branch falls back to normal
        assert_eq!(queue.dequeue().unwrap().name, "only");
        assert!(queue.is_empty());
        assert!(queue.links_consistent());
    }

    #[test]
    fn test_update_first_match_only() {
        let mut queue = queue_with(&[("ana", Normal), ("bia", Normal), ("ana", Normal)]);
        queue.update("ana", UpdatePatient::default().age(99)).unwrap();

        let ages: Vec<u32> = queue.snapshot().map(|p| p.age).collect();
        assert_eq!(ages, vec![99, 30, 30]);
        assert_eq!(queue.stats().total_updated, 1);
    }

    #[test]
    fn test_update_class_change_does_not_move() {
        let mut queue = queue_with(&[("e", Elevated), ("n1", Normal), ("n2", Normal)]);
        queue
            .update("n2", UpdatePatient::default().priority_class(Elevated))
            .unwrap();

        assert_eq!(names(&queue), vec!["e", "n1", "n2"]);
        let last = queue.snapshot().last().unwrap();
        assert_eq!(last.priority_class, Elevated);

        // a new elevated still stops at the first normal (n1)
        queue.enqueue("e2", 30, Elevated).unwrap();
        assert_eq!(names(&queue), vec!["e", "e2", "n1", "n2"]);
    }

    #[test]
    fn test_update_rename() {
        let mut queue = queue_with(&[("ana", Normal)]);
        queue.update("ana", UpdatePatient::default().name("Ana Maria")).unwrap();
        assert_eq!(names(&queue), vec!["Ana Maria"]);
    }

    #[test]
    fn test_update_not_found() {
        let mut queue = queue_with(&[("ana", Normal)]);
        let err = queue.update("bia", UpdatePatient::default().age(1)).unwrap_err();
        assert_eq!(err, QueueError::NotFound { name: "bia".to_string() });
        assert_eq!(queue.stats().total_updated, 0);
    }

    #[test]
    fn test_update_without_fields_finds_but_keeps_patient() {
        let mut queue = queue_with(&[("ana", Normal)]);
        let changes = UpdatePatient::default();
        assert!(changes.is_empty());

        queue.update("ana", changes).unwrap();
        assert_eq!(queue.snapshot().next(), Some(&Patient::new("ana", 30, Normal)));
        assert_eq!(
            queue.update("bia", UpdatePatient::default()),
            Err(QueueError::NotFound { name: "bia".to_string() })
        );
    }

    #[test]
    fn test_update_blank_new_name_changes_nothing() {
        let mut queue = queue_with(&[("ana", Normal)]);
        let err = queue
            .update("ana", UpdatePatient::default().name(" ").age(5))
            .unwrap_err();
        assert!(matches!(err, QueueError::InvalidArgument(_)));

        let patient = queue.snapshot().next().unwrap();
        assert_eq!(patient.name, "ana");
        assert_eq!(patient.age, 30);
    }

    #[test]
    fn test_snapshot_is_repeatable() {
        let queue = queue_with(&[("e", Elevated), ("n", Normal)]);
        let first: Vec<Patient> = queue.snapshot().cloned().collect();
        let second: Vec<Patient> = queue.snapshot().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(queue.snapshot().len(), 2);
    }

    #[test]
    fn test_round_trip_serves_everyone_once() {
        let mut queue = AdmissionQueue::new();
        let mut expected = Vec::new();
        for i in 0..20 {
            let class = if i % 3 == 0 { Elevated } else { Normal };
            let name = format!("p{i}");
            queue.enqueue(name.clone(), i, class).unwrap();
            expected.push(name);
        }

        let mut served = Vec::new();
        loop {
            match queue.dequeue() {
                Ok(patient) => served.push(patient.name),
                Err(QueueError::NoEligiblePatient { .. }) => continue,
                Err(QueueError::EmptyQueue) => break,
                Err(other) => panic!("unexpected error: {other}"),
            }
            assert!(queue.links_consistent());
        }

        assert_eq!(served.len(), expected.len());
        served.sort();
        expected.sort();
        assert_eq!(served, expected);
        assert_eq!(queue.stats().total_served(), 20);
    }

    #[tokio::test]
    async fn test_shared_queue_serializes_access() {
        let shared = AdmissionQueue::new().into_shared();
        {
            let mut queue = shared.lock().await;
            queue.enqueue("ana", 30, Normal).unwrap();
        }

        let other = Arc::clone(&shared);
        let served = tokio::spawn(async move { other.lock().await.dequeue() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(served.name, "ana");
        assert!(shared.lock().await.is_empty());
    }
}
