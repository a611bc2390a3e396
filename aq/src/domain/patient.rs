//! Patient records held by the admission queue

use serde::{Deserialize, Serialize};

use super::PriorityClass;

/// A patient waiting for service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub name: String,
    pub age: u32,
    pub priority_class: PriorityClass,
}

impl Patient {
    /// Create a new patient record
    pub fn new(name: impl Into<String>, age: u32, priority_class: PriorityClass) -> Self {
        Self {
            name: name.into(),
            age,
            priority_class,
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.priority_class.is_elevated()
    }
}

/// Renders as `[ <name> (P) ]` or `[ <name> (N) ]`
impl std::fmt::Display for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {} ({}) ]", self.name, self.priority_class.tag())
    }
}

/// Field overrides applied by `AdmissionQueue::update`
///
/// Each `None` leaves the corresponding field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePatient {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub priority_class: Option<PriorityClass>,
}

impl UpdatePatient {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn priority_class(mut self, priority_class: PriorityClass) -> Self {
        self.priority_class = Some(priority_class);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.priority_class.is_none()
    }

    /// Write the provided fields onto `patient`
    pub(crate) fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(priority_class) = self.priority_class {
            patient.priority_class = priority_class;
        }
    }
}
