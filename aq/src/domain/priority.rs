//! Priority classes for admission

use serde::{Deserialize, Serialize};

/// Service class a patient is admitted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriorityClass {
    #[default]
    Normal,
    Elevated,
}

impl PriorityClass {
    /// The class served after this one when alternating
    pub fn other(self) -> Self {
        match self {
            Self::Normal => Self::Elevated,
            Self::Elevated => Self::Normal,
        }
    }

    /// Single-letter tag used in queue renderings
    pub fn tag(self) -> char {
        match self {
            Self::Normal => 'N',
            Self::Elevated => 'P',
        }
    }

    pub fn is_elevated(self) -> bool {
        self == Self::Elevated
    }
}

impl std::fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Elevated => write!(f, "elevated"),
        }
    }
}

impl std::str::FromStr for PriorityClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" | "normal" => Ok(Self::Normal),
            "p" | "elevated" | "priority" => Ok(Self::Elevated),
            _ => Err(format!("Unknown priority class: {} (expected P or N)", s)),
        }
    }
}
