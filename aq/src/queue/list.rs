//! Doubly linked patient sequence stored in an index arena
//!
//! Nodes live in a slot vector and refer to each other by slot index, so the
//! links are plain `Option<usize>` values owned by the list. Slots freed by
//! `unlink` are recycled by later inserts.

use crate::domain::Patient;

#[derive(Debug)]
struct Node {
    patient: Patient,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct PatientList {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl PatientList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    fn node(&self, idx: usize) -> &Node {
        match self.slots.get(idx) {
            Some(Some(node)) => node,
            _ => panic!("PatientList: stale slot index {idx}"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node {
        match self.slots.get_mut(idx) {
            Some(Some(node)) => node,
            _ => panic!("PatientList: stale slot index {idx}"),
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, idx: usize) -> Option<&Patient> {
        self.slots.get(idx)?.as_ref().map(|node| &node.patient)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Patient> {
        self.slots.get_mut(idx)?.as_mut().map(|node| &mut node.patient)
    }

    /// Append at the tail, returning the new node's slot
    pub(crate) fn push_back(&mut self, patient: Patient) -> usize {
        let prev = self.tail;
        let idx = self.alloc(Node {
            patient,
            prev,
            next: None,
        });

        match prev {
            Some(tail) => self.node_mut(tail).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        idx
    }

    /// Insert immediately before `at`; becomes the head when `at` is the head
    pub(crate) fn insert_before(&mut self, at: usize, patient: Patient) -> usize {
        let prev = self.node(at).prev;
        let idx = self.alloc(Node {
            patient,
            prev,
            next: Some(at),
        });

        self.node_mut(at).prev = Some(idx);
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(idx),
            None => self.head = Some(idx),
        }
        idx
    }

    /// Detach the node at `idx`, repairing neighbour and end links
    pub(crate) fn unlink(&mut self, idx: usize) -> Patient {
        let node = match self.slots.get_mut(idx).and_then(Option::take) {
            Some(node) => node,
            None => panic!("PatientList: unlink of empty slot {idx}"),
        };
        self.free.push(idx);
        self.len -= 1;

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        node.patient
    }

    /// Slot of the first node, head to tail, whose patient matches
    pub(crate) fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&Patient) -> bool,
    {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx);
            if pred(&node.patient) {
                return Some(idx);
            }
            cursor = node.next;
        }
        None
    }

    pub(crate) fn iter(&self) -> Snapshot<'_> {
        Snapshot {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Walk head to tail checking every link against its neighbour
    pub(crate) fn links_consistent(&self) -> bool {
        match (self.head, self.tail) {
            (None, None) => return self.len == 0,
            (Some(_), Some(_)) => {}
            _ => return false,
        }

        let mut prev = None;
        let mut cursor = self.head;
        let mut seen = 0;
        while let Some(idx) = cursor {
            let Some(Some(node)) = self.slots.get(idx) else {
                return false;
            };
            if node.prev != prev {
                return false;
            }
            seen += 1;
            if seen > self.len {
                // cycle
                return false;
            }
            prev = Some(idx);
            cursor = node.next;
        }

        prev == self.tail && seen == self.len
    }
}

/// Read-only head-to-tail view of the queue
///
/// A clone continues from the same position, so clone before consuming to
/// walk the view twice.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    list: &'a PatientList,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Snapshot<'a> {
    type Item = &'a Patient;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.node(idx);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.patient)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Snapshot<'_> {}

impl std::iter::FusedIterator for Snapshot<'_> {}
